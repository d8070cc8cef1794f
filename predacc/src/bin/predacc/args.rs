//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "accuracy")]
	Accuracy(Accuracy),

	#[clap(name = "latency")]
	Latency(Latency),
}

/// Evaluates prediction accuracy over one or more window widths
#[derive(Debug, clap::Args)]
pub struct Accuracy {
	/// Observed trace file
	pub trace_file: PathBuf,

	/// Predicted trace file
	#[clap(long = "pred")]
	pub pred_file: PathBuf,

	/// Cold (inverse) prediction trace file
	#[clap(long = "cold")]
	pub cold_file: Option<PathBuf>,

	/// Window widths, in normalized trace-time units
	#[clap(long = "window", required = true, num_args = 1..)]
	pub windows: Vec<f64>,

	/// Runtime log file, to report the traced run's total runtime
	#[clap(long = "runtime-log")]
	pub runtime_log_file: Option<PathBuf>,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Output file
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}

/// Measures page migration latency from a runtime log
#[derive(Debug, clap::Args)]
pub struct Latency {
	/// Runtime log file
	pub runtime_log_file: PathBuf,

	/// Output file
	#[clap(long = "output")]
	pub output_file: Option<PathBuf>,
}
