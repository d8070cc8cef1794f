//! Prediction accuracy for `pebs` memory-access traces (`predacc`)

// Modules
mod args;
mod config;

// Imports
use {
	self::args::Args,
	anyhow::Context,
	average::Variance,
	clap::Parser,
	predacc::{
		data,
		eval::Evaluator,
		latency,
		log as runtime_log,
		normalize,
		trace::Trace,
	},
	predacc_util::logger,
	regex::Regex,
	std::{fs, io, path::Path, time::Duration},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		args::SubCmd::Accuracy(cmd) => self::run_accuracy(&cmd),
		args::SubCmd::Latency(cmd) => self::run_latency(&cmd),
	}
}

/// Runs the `accuracy` sub-command
fn run_accuracy(cmd: &args::Accuracy) -> Result<(), anyhow::Error> {
	// Read the config file, or use the defaults
	let config = match &cmd.config_file {
		Some(config_file) => {
			let config_file = fs::File::open(config_file).context("Unable to open config file")?;
			serde_json::from_reader::<_, self::config::Config>(config_file).context("Unable to parse config file")?
		},
		None => self::config::Config::default(),
	};

	// Read the traces
	let observed_trace = self::read_trace(&cmd.trace_file).context("Unable to read trace file")?;
	let predicted_trace = self::read_trace(&cmd.pred_file).context("Unable to read pred file")?;
	tracing::debug!(
		observed_records = observed_trace.len(),
		predicted_records = predicted_trace.len(),
		"Read traces"
	);

	// Report the traced run's total runtime, if a log was supplied
	let runtime_secs = match &cmd.runtime_log_file {
		Some(log_file) => {
			let log = fs::read_to_string(log_file).context("Unable to read runtime log file")?;
			let (first, last) = runtime_log::runtime_span(&log).context("Unable to parse runtime log")?;
			let runtime_secs = last - first;
			tracing::info!("Total runtime: {runtime_secs:.2}s");
			Some(runtime_secs)
		},
		None => None,
	};

	// Evaluate the predictions over all windows in a single pass
	let evaluator = Evaluator::new(Duration::from_secs_f64(config.progress_period_secs));
	let (observed, predicted) =
		normalize::normalize_pair(&observed_trace, &predicted_trace).context("Unable to normalize traces")?;
	let results = evaluator
		.evaluate(&observed, &predicted, &cmd.windows)
		.context("Unable to evaluate predictions")?;
	tracing::info!("Evaluated {} predictions", results.total_predictions);
	for window in &results.windows {
		tracing::info!(
			"Window {:e}: {} hits, {} misses ({:.2}%)",
			window.width,
			window.hits,
			window.misses,
			window.accuracy_percent()
		);
	}

	// Evaluate the cold trace, if any.
	// Note: The cold trace is normalized against the observed trace
	//       separately, since its time span may differ from the
	//       predicted trace's.
	let cold_accuracy = match &cmd.cold_file {
		Some(cold_file) => {
			let cold_trace = self::read_trace(cold_file).context("Unable to read cold file")?;
			let (observed, cold) =
				normalize::normalize_pair(&observed_trace, &cold_trace).context("Unable to normalize cold trace")?;
			let results = evaluator
				.evaluate(&observed, &cold, &cmd.windows)
				.context("Unable to evaluate cold predictions")?;

			let cold_accuracy = data::AccuracyData::from_inverse_results(&results);
			for window in &cold_accuracy.windows {
				tracing::info!(
					"Cold window {:e}: {} hits, {} misses ({:.2}%)",
					window.window,
					window.hits,
					window.misses,
					window.accuracy_percent
				);
			}

			Some(cold_accuracy)
		},
		None => None,
	};

	// Finally write the output data
	if let Some(output_file) = &cmd.output_file {
		let data = data::Data {
			runtime_secs,
			accuracy: data::AccuracyData::from_results(&results),
			cold_accuracy,
		};

		let output_file = fs::File::create(output_file).context("Unable to create output file")?;
		serde_json::to_writer(output_file, &data).context("Unable to write to output file")?;
	}

	Ok(())
}

/// Runs the `latency` sub-command
fn run_latency(cmd: &args::Latency) -> Result<(), anyhow::Error> {
	let begin_regex = Regex::new(runtime_log::MADE_HOT_PATTERN).context("Invalid begin pattern")?;
	let complete_regex = Regex::new(runtime_log::FINISHED_MIGRATION_PATTERN).context("Invalid completion pattern")?;

	// Parse the log and match migrations to their completions
	let log = fs::read_to_string(&cmd.runtime_log_file).context("Unable to read runtime log file")?;
	let (first, last) = runtime_log::runtime_span(&log).context("Unable to parse runtime log")?;
	let (begins, completions) =
		runtime_log::parse_events(&log, &begin_regex, &complete_regex).context("Unable to parse migration events")?;
	tracing::debug!(
		begins = begins.len(),
		completions = completions.len(),
		"Parsed migration events"
	);

	let samples = latency::match_completions(&begins, &completions);

	let latencies = samples.iter().map(|sample| sample.latency).collect::<Variance>();
	tracing::info!(
		"Matched {} / {} migrations, average latency {:.4} ± {:.4}s",
		samples.len(),
		begins.len(),
		latencies.mean(),
		latencies.error()
	);

	// Then write the output data
	if let Some(output_file) = &cmd.output_file {
		let data = data::LatencyData::from_samples(last - first, &samples);

		let output_file = fs::File::create(output_file).context("Unable to create output file")?;
		serde_json::to_writer(output_file, &data).context("Unable to write to output file")?;
	}

	Ok(())
}

/// Reads the trace at `path`
fn read_trace(path: &Path) -> Result<Trace, anyhow::Error> {
	let file = fs::File::open(path).context("Unable to open file")?;
	Trace::from_reader(io::BufReader::new(file)).context("Unable to parse trace")
}
