//! Creates graphs from `predacc`'s output

// Modules
mod args;

// Imports
use {
	anyhow::Context,
	args::Args,
	clap::Parser,
	itertools::Itertools,
	plotlib::{
		page::Page,
		repr::Plot,
		style::{LineJoin, LineStyle, PointStyle},
		view::ContinuousView,
	},
	predacc::{data, latency},
	predacc_util::logger,
};

/// Line colors, cycled across inputs
const LINE_COLORS: &[&str] = &["#0072b2", "#d55e00", "#009e73", "#cc79a7", "#e69f00"];

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Then check the sub-command
	match args.sub_cmd {
		args::SubCmd::PredAccuracy(cmd) => {
			anyhow::ensure!(
				cmd.labels.is_empty() || cmd.labels.len() == cmd.input_files.len(),
				"Expected one label per input file"
			);

			let mut view = ContinuousView::new()
				.x_label("Window size (log10)")
				.y_label("Accuracy (%)")
				.y_range(0.0, 100.0);

			for (idx, input_file) in cmd.input_files.iter().enumerate() {
				// Parse the accuracy data
				let data = {
					let input_file = std::fs::File::open(input_file).context("Unable to open input file")?;
					serde_json::from_reader::<_, data::Data>(input_file).context("Unable to parse input file")?
				};
				let accuracy = match cmd.cold {
					true => data
						.cold_accuracy
						.with_context(|| format!("Input file {input_file:?} has no cold accuracy data"))?,
					false => data.accuracy,
				};

				// Then build the points, ascending by window.
				// Note: The evaluator reports windows in request order, so we
				//       sort here for the line to be drawn left-to-right.
				//       Zero-width windows can't be placed on the log axis
				//       and are skipped.
				let points = accuracy
					.windows
					.iter()
					.map(|window| (window.window.log10(), window.accuracy_percent))
					.filter(|&(window, _)| window.is_finite())
					.sorted_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0))
					.collect::<Vec<_>>();

				let color = LINE_COLORS[idx % LINE_COLORS.len()];
				let mut plot = Plot::new(points)
					.line_style(LineStyle::new().width(1.0).colour(color).linejoin(LineJoin::Round))
					.point_style(PointStyle::new().size(1.5).colour(color));
				if let Some(label) = cmd.labels.get(idx) {
					plot = plot.legend(label.clone());
				}
				view = view.add(plot);
			}

			Page::single(&view)
				.dimensions(cmd.output.width, cmd.output.height)
				.save(&cmd.output.file)
				.map_err(|err| anyhow::anyhow!("Unable to save output file: {err:?}"))?;
			tracing::debug!("Saved graph to {:?}", cmd.output.file);
		},

		args::SubCmd::MigrationLatency(cmd) => {
			// Parse the latency data
			let data = {
				let input_file = std::fs::File::open(&cmd.input_file).context("Unable to open input file")?;
				serde_json::from_reader::<_, data::LatencyData>(input_file).context("Unable to parse input file")?
			};

			// Then bin it over the run's span
			let samples = data
				.samples
				.iter()
				.map(|sample| latency::LatencySample {
					begin_time: sample.begin_time,
					latency:    sample.latency,
				})
				.collect::<Vec<_>>();
			let points = latency::bin_averages(&samples, data.runtime_secs, cmd.bin_size);

			// Finally build the plot and render it
			let plot = Plot::new(points)
				.line_style(LineStyle::new().width(1.0).colour("#000000").linejoin(LineJoin::Round));

			let view = ContinuousView::new()
				.add(plot)
				.x_label("Time (s)")
				.y_label("Average migration latency (s)");

			Page::single(&view)
				.dimensions(cmd.output.width, cmd.output.height)
				.save(&cmd.output.file)
				.map_err(|err| anyhow::anyhow!("Unable to save output file: {err:?}"))?;
			tracing::debug!("Saved graph to {:?}", cmd.output.file);
		},
	}

	Ok(())
}
