//! Multi-window evaluator.

// Imports
use {
	crate::{
		normalize::{Event, NormalizedTrace},
		trace::TraceRole,
		window::SlidingWindow,
	},
	average::Variance,
	predacc_util::DisplayWrapper,
	std::time::{Duration, Instant},
};

/// Evaluator
#[derive(Debug)]
pub struct Evaluator {
	/// Progress output period
	///
	/// Interval in which to output progress for the evaluation pass
	progress_period: Duration,
}

impl Evaluator {
	/// Creates a new evaluator
	pub fn new(progress_period: Duration) -> Self {
		Self { progress_period }
	}

	/// Evaluates how well `predicted` anticipates `observed`, for each width in `widths`.
	///
	/// A prediction counts as a hit for a width `w` when its address is
	/// observed within `[prediction time, prediction time + w]`. Every width
	/// is evaluated independently over a single pass of the predicted trace,
	/// so results don't depend on how many widths are requested, nor on
	/// their order; the output preserves the order of `widths`.
	///
	/// # Panics
	/// Panics if any width is negative or not finite.
	pub fn evaluate(
		&self,
		observed: &NormalizedTrace,
		predicted: &NormalizedTrace,
		widths: &[f64],
	) -> Result<EvalResults, EvalError> {
		if observed.is_empty() {
			return Err(EvalError::EmptyTrace {
				role: TraceRole::Observed,
			});
		}
		if predicted.is_empty() {
			return Err(EvalError::NoPredictions);
		}

		// Note: `NormalizedTrace` sorts on construction, so a violation here
		//       is a bug in this crate, not bad input data.
		debug_assert!(self::is_time_sorted(observed.events()), "Observed trace isn't ascending");
		debug_assert!(self::is_time_sorted(predicted.events()), "Predicted trace isn't ascending");

		// One independent window state per width, all over the same
		// observed trace
		let mut windows = widths
			.iter()
			.map(|&width| WindowState {
				window: SlidingWindow::new(observed.events(), width),
				hits:   0,
				misses: 0,
			})
			.collect::<Vec<_>>();

		let total_predictions = predicted.len() as u64;

		// Note: We start in the past so that we output right away at the
		//       start, saturating when the period exceeds the clock
		let mut last_progress_time = {
			let now = Instant::now();
			now.checked_sub(self.progress_period).unwrap_or(now)
		};

		for (prediction_idx, prediction) in predicted.events().iter().enumerate() {
			for state in &mut windows {
				state.window.advance_to(prediction.time);
				match state.window.contains(prediction.record.addr) {
					true => state.hits += 1,
					false => state.misses += 1,
				}
			}

			// Then show progress, if it's been long enough
			let cur_time = Instant::now();
			if cur_time.duration_since(last_progress_time) >= self.progress_period {
				let processed_percentage = 100.0 * (prediction_idx as f64 / total_predictions as f64);
				tracing::info!(
					"[{processed_percentage:.2}%] Progress: {}",
					DisplayWrapper::new(|f| self::fmt_progress(&windows, f))
				);
				last_progress_time = cur_time;
			}
		}

		Ok(EvalResults {
			total_predictions,
			windows: windows
				.into_iter()
				.map(|state| WindowAccuracy {
					width:  state.window.width(),
					hits:   state.hits,
					misses: state.misses,
				})
				.collect(),
		})
	}
}

/// Error for [`Evaluator::evaluate`]
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
	/// A required trace had no records
	#[error("The {role} trace has no records")]
	EmptyTrace {
		/// Which trace was empty
		role: TraceRole,
	},

	/// No predictions to evaluate.
	///
	/// Distinct from a computed 0% accuracy: with no predictions the
	/// accuracy is undefined.
	#[error("The predicted trace has no entries, accuracy is undefined")]
	NoPredictions,
}

/// Results of an evaluation pass
#[derive(Clone, Debug)]
pub struct EvalResults {
	/// Total predictions evaluated.
	///
	/// Every prediction is evaluated against every width, so this is the
	/// same for all windows.
	pub total_predictions: u64,

	/// Per-width results, in the order the widths were supplied
	pub windows: Vec<WindowAccuracy>,
}

/// Accuracy of a single window width
#[derive(Clone, Copy, Debug)]
pub struct WindowAccuracy {
	/// Window width
	pub width: f64,

	/// Predictions whose address was observed within the window
	pub hits: u64,

	/// Predictions whose address wasn't observed within the window
	pub misses: u64,
}

impl WindowAccuracy {
	/// Returns the total evaluated predictions
	pub fn total(self) -> u64 {
		self.hits + self.misses
	}

	/// Returns the accuracy, as a percentage
	pub fn accuracy_percent(self) -> f64 {
		100.0 * (self.hits as f64 / self.total() as f64)
	}
}

/// Per-width evaluation state
#[derive(Debug)]
struct WindowState<'a> {
	/// Sliding window over the observed trace
	window: SlidingWindow<'a>,

	/// Hits so far
	hits: u64,

	/// Misses so far
	misses: u64,
}

/// Returns if `events` is ascending by time
fn is_time_sorted(events: &[Event]) -> bool {
	events.windows(2).all(|pair| pair[0].time <= pair[1].time)
}

/// Formats progress output for all window states to `f`
fn fmt_progress(windows: &[WindowState<'_>], f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
	// Note: Start with a newline, since we're a multi-line output
	f.pad("\n")?;

	for state in windows {
		let total = state.hits + state.misses;
		let hit_percentage = 100.0 * (state.hits as f64 / total as f64);
		writeln!(
			f,
			"Window {:e}: {} / {total} hits ({hit_percentage:.2}%), {} live events",
			state.window.width(),
			state.hits,
			state.window.len()
		)?;
	}

	let occupancy = windows
		.iter()
		.map(|state| state.window.len() as f64)
		.collect::<Variance>();
	writeln!(f, "Average occupancy: {:.2} ± {:.2}", occupancy.mean(), occupancy.error())?;

	Ok(())
}

#[cfg(test)]
mod test {
	use {
		super::*,
		crate::trace::{Record, RecordKind},
	};

	/// Creates an evaluator with a long enough progress period to stay quiet
	fn evaluator() -> Evaluator {
		Evaluator::new(Duration::from_secs(3600))
	}

	/// Creates a trace with `(time, addr)` events
	fn trace(events: &[(f64, u64)]) -> NormalizedTrace {
		NormalizedTrace::from_events(
			events
				.iter()
				.map(|&(time, addr)| Event {
					time,
					record: Record {
						cycle: 0,
						addr,
						ip: 0,
						cpu: 0,
						kind: RecordKind::DramRead,
					},
				})
				.collect(),
		)
	}

	/// Returns the accuracies of evaluating `widths`, in order
	fn accuracies(observed: &NormalizedTrace, predicted: &NormalizedTrace, widths: &[f64]) -> Vec<f64> {
		let results = evaluator()
			.evaluate(observed, predicted, widths)
			.expect("Unable to evaluate");
		results
			.windows
			.iter()
			.map(|window| window.accuracy_percent())
			.collect()
	}

	#[test]
	fn concrete_scenario() {
		// Prediction at 0 sees `[0, 1] = {10, 20}`: hit.
		// Prediction at 2 sees `[2, 3] = {10}`: miss for 20.
		let observed = trace(&[(0.0, 10), (1.0, 20), (3.0, 10)]);
		let predicted = trace(&[(0.0, 10), (2.0, 20)]);

		let results = evaluator()
			.evaluate(&observed, &predicted, &[1.0])
			.expect("Unable to evaluate");
		assert_eq!(results.total_predictions, 2);
		assert_eq!(results.windows[0].hits, 1);
		assert_eq!(results.windows[0].misses, 1);
		assert_eq!(results.windows[0].accuracy_percent(), 50.0);
	}

	#[test]
	fn zero_width_scenario() {
		// Prediction at 0 sees `[0, 0] = {10}`: hit.
		// Prediction at 2 sees `[2, 2] = {}`: miss.
		let observed = trace(&[(0.0, 10), (1.0, 20), (3.0, 10)]);
		let predicted = trace(&[(0.0, 10), (2.0, 20)]);

		assert_eq!(accuracies(&observed, &predicted, &[0.0]), [50.0]);
	}

	#[test]
	fn window_independence() {
		let observed = trace(&[
			(0.0, 1),
			(0.1, 2),
			(0.2, 1),
			(0.4, 3),
			(0.5, 2),
			(0.7, 4),
			(0.9, 1),
			(1.0, 5),
		]);
		let predicted = trace(&[(0.0, 1), (0.1, 5), (0.3, 2), (0.6, 1), (0.8, 5), (0.95, 4)]);

		let widths = [0.0, 0.05, 0.2, 0.5, 1.0];
		let alone = widths
			.iter()
			.map(|&width| accuracies(&observed, &predicted, &[width])[0])
			.collect::<Vec<_>>();

		// Together, reversed and shuffled must all match evaluating each
		// width alone
		assert_eq!(accuracies(&observed, &predicted, &widths), alone);

		let reversed = widths.iter().rev().copied().collect::<Vec<_>>();
		let alone_reversed = alone.iter().rev().copied().collect::<Vec<_>>();
		assert_eq!(accuracies(&observed, &predicted, &reversed), alone_reversed);

		let shuffled = [0.2, 1.0, 0.0, 0.5, 0.05];
		let alone_shuffled = [alone[2], alone[4], alone[0], alone[3], alone[1]];
		assert_eq!(accuracies(&observed, &predicted, &shuffled), alone_shuffled);
	}

	#[test]
	fn hits_and_misses_total() {
		let observed = trace(&[(0.0, 1), (0.3, 2), (0.6, 3), (0.9, 1)]);
		let predicted = trace(&[(0.0, 1), (0.2, 9), (0.5, 3), (0.8, 2), (1.0, 1)]);

		let results = evaluator()
			.evaluate(&observed, &predicted, &[0.0, 0.1, 0.5, 2.0])
			.expect("Unable to evaluate");
		for window in &results.windows {
			assert_eq!(window.hits + window.misses, results.total_predictions);
		}
	}

	#[test]
	fn single_prediction() {
		let observed = trace(&[(0.0, 1), (1.0, 2)]);

		// One matching prediction: 100%, no arithmetic errors
		let predicted = trace(&[(0.5, 2)]);
		assert_eq!(accuracies(&observed, &predicted, &[1.0]), [100.0]);

		// One non-matching prediction: 0%
		let predicted = trace(&[(0.5, 9)]);
		assert_eq!(accuracies(&observed, &predicted, &[1.0]), [0.0]);
	}

	#[test]
	fn no_predictions() {
		let observed = trace(&[(0.0, 1)]);
		let predicted = trace(&[]);

		assert!(matches!(
			evaluator().evaluate(&observed, &predicted, &[1.0]),
			Err(EvalError::NoPredictions)
		));
	}

	#[test]
	fn empty_observed_trace() {
		let observed = trace(&[]);
		let predicted = trace(&[(0.0, 1)]);

		assert!(matches!(
			evaluator().evaluate(&observed, &predicted, &[1.0]),
			Err(EvalError::EmptyTrace {
				role: TraceRole::Observed
			})
		));
	}

	#[test]
	fn full_pipeline() {
		// Same scenario as `concrete_scenario`, but going through raw
		// records and normalization: the joint range is [0, 3], so a
		// width of 1 in cycle units becomes 1/3 of the normalized run.
		let record = |cycle, addr| Record {
			cycle,
			addr,
			ip: 0,
			cpu: 0,
			kind: RecordKind::DramRead,
		};
		let observed = crate::Trace::from_records(vec![record(0, 10), record(1, 20), record(3, 10)]);
		let predicted = crate::Trace::from_records(vec![record(0, 10), record(2, 20)]);

		let (observed, predicted) =
			crate::normalize::normalize_pair(&observed, &predicted).expect("Unable to normalize");
		let results = evaluator()
			.evaluate(&observed, &predicted, &[1.0, 0.0])
			.expect("Unable to evaluate");

		// Width 1 covers the whole run forward from each prediction, but
		// the access of address 20 is already in the past by the second
		// prediction: one hit, one miss. Width 0 only hits the
		// prediction at an exact observed instant: also one of each.
		assert_eq!(results.windows[0].accuracy_percent(), 50.0);
		assert_eq!(results.windows[1].accuracy_percent(), 50.0);
	}

	#[test]
	fn no_widths() {
		let observed = trace(&[(0.0, 1)]);
		let predicted = trace(&[(0.5, 1)]);

		let results = evaluator()
			.evaluate(&observed, &predicted, &[])
			.expect("Unable to evaluate");
		assert_eq!(results.total_predictions, 1);
		assert!(results.windows.is_empty());
	}
}
