//! `xasy` command line front end.
//!
//! Drives one interpreter session per invocation:
//! - render a script file into fragments
//! - resolve a pen expression to a concrete color
//! - compute the Bezier controls of a path literal
//! - run raw statements and print what the interpreter writes

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use xasy_model::{AsyOracle, DEFAULT_WIDTH, Item, Oracle, Pen};
use xasy_session::{Session, SessionConfig};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "xasy")]
#[command(about = "Query and render through a long-lived Asymptote session")]
struct Args {
	/// Interpreter executable
	#[arg(long, env = "ASY", default_value = "asy", value_name = "PATH")]
	asy: PathBuf,

	/// Directory the interpreter runs in; fragment files appear here
	#[arg(long, default_value = ".", value_name = "DIR")]
	work_dir: PathBuf,

	/// Kill the interpreter when one output line takes longer than this
	#[arg(long, value_name = "SECS")]
	timeout: Option<f64>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Render a script file and list its fragments
	Deconstruct {
		/// Script to render
		file: PathBuf,
		/// Save non-empty fragments here as PNG
		#[arg(long, value_name = "DIR")]
		out: Option<PathBuf>,
	},
	/// Resolve a pen expression such as `red` or `0.5*blue+green`
	Color {
		/// Pen expression
		pen: String,
	},
	/// Compute the Bezier controls of a path literal
	Path {
		/// Path literal such as `(0,0)..(1,1)--cycle`
		literal: String,
	},
	/// Run statements and print the interpreter's output
	Run {
		/// Statements, one per argument
		#[arg(required = true)]
		statements: Vec<String>,
	},
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let executable = which::which(&args.asy)
		.with_context(|| format!("interpreter {} not found", args.asy.display()))?;
	info!(asy = %executable.display(), work_dir = %args.work_dir.display(), "starting session");

	let mut config = SessionConfig::new(executable).work_dir(&args.work_dir);
	if let Some(secs) = args.timeout {
		let limit = Duration::try_from_secs_f64(secs).with_context(|| format!("invalid timeout {secs}"))?;
		config = config.timeout(limit);
	}
	let session = Arc::new(Session::with_config(config));
	let oracle = AsyOracle::new(session.clone(), &args.work_dir);

	match args.command {
		Command::Deconstruct { file, out } => deconstruct(&oracle, file, out).await,
		Command::Color { pen } => {
			let mut pen = Pen::symbolic(pen, DEFAULT_WIDTH);
			let color = pen.resolve(&oracle).await.context("resolving pen color")?;
			println!("{color} {}", color.to_hex());
			Ok(())
		}
		Command::Path { literal } => {
			let path = oracle.path_controls(&literal).await.context("computing path controls")?;
			println!("{}", path.code());
			debug!(segments = path.segment_count(), "path computed");
			Ok(())
		}
		Command::Run { statements } => {
			for statement in &statements {
				session.execute(statement).await?;
			}
			let mut exchange = session.exchange().await?;
			for line in exchange.sync_collect().await? {
				println!("{line}");
			}
			Ok(())
		}
	}
}

async fn deconstruct(oracle: &AsyOracle, file: PathBuf, out: Option<PathBuf>) -> Result<()> {
	let source = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
	if let Some(dir) = &out {
		std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
	}

	let mut item = Item::script(source, Vec::new());
	let fragments = item.asyfy(oracle, None).await.context("deconstructing")?;
	for fragment in fragments {
		let Some(raster) = &fragment.raster else {
			println!("{} empty", fragment.index);
			continue;
		};
		println!(
			"{} {} {}x{} {}",
			fragment.index,
			fragment.bbox,
			raster.width(),
			raster.height(),
			fragment.format
		);
		if let Some(dir) = &out {
			let path = dir.join(format!("fragment-{}.png", fragment.index));
			raster.save(&path).with_context(|| format!("saving {}", path.display()))?;
		}
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("xasy=debug,xasy_session=debug,xasy_model=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
