use std::fmt;

/// An RGB color with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
	/// Red channel.
	pub r: f64,
	/// Green channel.
	pub g: f64,
	/// Blue channel.
	pub b: f64,
}

impl Rgb {
	/// Black.
	pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
	/// White.
	pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

	/// Create a color without clamping.
	pub const fn new(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b }
	}

	/// Create a color, clamping every channel into `[0, 1]`.
	pub fn clamped(r: f64, g: f64, b: f64) -> Self {
		Self::new(clamp_unit(r), clamp_unit(g), clamp_unit(b))
	}

	/// A gray level replicated to all three channels.
	pub fn gray(level: f64) -> Self {
		Self::clamped(level, level, level)
	}

	/// Convert subtractive CMYK components.
	pub fn from_cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
		let k = 1.0 - k;
		Self::clamped((1.0 - c) * k, (1.0 - m) * k, (1.0 - y) * k)
	}

	/// Channels in display order.
	pub const fn channels(self) -> [f64; 3] {
		[self.r, self.g, self.b]
	}

	/// Display color as `#rrggbb`.
	///
	/// Each channel maps to `floor(256 * c)` capped at 255, so `1.0` becomes `ff`.
	pub fn to_hex(self) -> String {
		let [r, g, b] = self.channels().map(channel_byte);
		format!("#{r:02x}{g:02x}{b:02x}")
	}

	/// Interpreter code for this color, `rgb(r,g,b)`.
	pub fn code(&self) -> String {
		self.to_string()
	}

	/// Component-wise comparison within `tolerance`.
	pub fn approx_eq(self, other: Rgb, tolerance: f64) -> bool {
		self.channels()
			.iter()
			.zip(other.channels())
			.all(|(a, b)| (a - b).abs() <= tolerance)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({},{},{})", self.r, self.g, self.b)
	}
}

fn clamp_unit(c: f64) -> f64 {
	if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }
}

fn channel_byte(c: f64) -> u8 {
	(clamp_unit(c) * 256.0).floor().min(255.0) as u8
}

/// Colorspaces the interpreter can report for a pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colorspace {
	/// One gray component.
	Gray,
	/// Three additive components.
	Rgb,
	/// Four subtractive components.
	Cmyk,
}

impl Colorspace {
	/// Recognise a reported colorspace name.
	///
	/// The interpreter may decorate the name (prompts, quotes), so this matches by
	/// substring, checking `cmyk` before `rgb` before `gray`.
	pub fn from_report(name: &str) -> Option<Self> {
		let name = name.to_ascii_lowercase();
		if name.contains("cmyk") {
			Some(Self::Cmyk)
		} else if name.contains("rgb") {
			Some(Self::Rgb)
		} else if name.contains("gray") || name.contains("grey") {
			Some(Self::Gray)
		} else {
			None
		}
	}

	/// How many components a pen in this colorspace reports.
	pub const fn component_count(self) -> usize {
		match self {
			Self::Gray => 1,
			Self::Rgb => 3,
			Self::Cmyk => 4,
		}
	}

	/// Convert reported components to RGB. Returns `None` on a count mismatch.
	pub fn to_rgb(self, components: &[f64]) -> Option<Rgb> {
		match (self, components) {
			(Self::Gray, &[level]) => Some(Rgb::gray(level)),
			(Self::Rgb, &[r, g, b]) => Some(Rgb::clamped(r, g, b)),
			(Self::Cmyk, &[c, m, y, k]) => Some(Rgb::from_cmyk(c, m, y, k)),
			_ => None,
		}
	}
}

impl fmt::Display for Colorspace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Gray => "gray",
			Self::Rgb => "rgb",
			Self::Cmyk => "cmyk",
		})
	}
}
