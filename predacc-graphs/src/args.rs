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
	#[clap(name = "pred-accuracy")]
	PredAccuracy(PredAccuracy),

	#[clap(name = "migration-latency")]
	MigrationLatency(MigrationLatency),
}

/// Creates an accuracy-vs-window graph from one or more runs
#[derive(Debug, clap::Args)]
pub struct PredAccuracy {
	/// Input files
	#[clap(required = true, num_args = 1..)]
	pub input_files: Vec<PathBuf>,

	/// Label for each input file, in order
	#[clap(long = "label")]
	pub labels: Vec<String>,

	/// Whether to graph the cold accuracies instead
	#[clap(long = "cold")]
	pub cold: bool,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Creates a graph of average migration latency over time
#[derive(Debug, clap::Args)]
pub struct MigrationLatency {
	/// Input file
	pub input_file: PathBuf,

	/// Bin size, in seconds
	#[clap(long = "bin-size", default_value_t = 1.0)]
	pub bin_size: f64,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Output
#[derive(Debug, clap::Args)]
pub struct Output {
	/// Output file
	#[clap(short = 'o', long = "output", default_value = "graph.svg")]
	pub file: PathBuf,

	/// Output file width
	#[clap(long = "output-width", default_value_t = 640)]
	pub width: u32,

	/// Output file height
	#[clap(long = "output-height", default_value_t = 480)]
	pub height: u32,
}
