use std::{path::PathBuf, process::ExitCode};
use clap::Parser;
use log::{error, info, LevelFilter, Log, Metadata, Record};
use config::Config;

mod batch;
mod config;

struct Logger;

impl Log for Logger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record) {
		if self.enabled(record.metadata()) {
			eprintln!("[{}] {:5} {}", chrono::Local::now().format("%H:%M:%S"), record.level(), record.args());
		}
	}

	fn flush(&self) {}
}

static LOGGER: Logger = Logger;

/// Extracts Privateer 2 assets: archives, forms, images, sounds and text.
/// Defaults for the output directory and threads come from the config file.
#[derive(Parser, Debug)]
#[command(name = "p2file-dump", version)]
struct Args {
	/// Directory the extracted files are written to
	#[arg(short, long, value_name = "DIR")]
	out: Option<PathBuf>,

	/// Number of worker threads
	#[arg(short = 'j', long, value_name = "N")]
	threads: Option<usize>,

	/// Also write every chunk payload as .bin
	#[arg(long)]
	raw: bool,

	/// Skip writing PNG images
	#[arg(long)]
	no_images: bool,

	/// Log every chunk
	#[arg(short, long, group = "verbosity")]
	verbose: bool,

	/// Only log warnings and errors
	#[arg(short, long, group = "verbosity")]
	quiet: bool,

	/// Files or directories (one level deep) to extract
	#[arg(required = true, value_name = "FILE")]
	inputs: Vec<PathBuf>
}

impl Args {
	fn level(&self) -> LevelFilter {
		if self.verbose {
			LevelFilter::Debug
		} else if self.quiet {
			LevelFilter::Warn
		} else {
			LevelFilter::Info
		}
	}
}

fn main() -> ExitCode {
	let args = Args::parse();
	if log::set_logger(&LOGGER).is_ok() {
		log::set_max_level(args.level());
	}

	let mut config = Config::load();
	if let Some(out_dir) = args.out {
		config.out_dir = out_dir;
	}
	if let Some(threads) = args.threads {
		config.threads = threads.max(1);
	}
	config.write_raw_chunks |= args.raw;
	config.convert_images &= !args.no_images;

	let files = batch::survey(&args.inputs);
	info!("found {} files, writing to '{}'", files.len(), config.out_dir.display());
	let summary = batch::run(files, &config);
	info!("done: {} processed, {} failed, {} files written", summary.processed, summary.failed, summary.written);
	if summary.failed > 0 {
		error!("{} files could not be extracted", summary.failed);
		return ExitCode::FAILURE;
	}
	ExitCode::SUCCESS
}
