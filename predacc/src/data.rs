//! Output data
//!
//! Serialized by the `predacc` binary and read back by `predacc-graphs`.

// Imports
use crate::{eval::EvalResults, latency::LatencySample};

/// Output data for an accuracy evaluation
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Data {
	/// Total runtime of the traced run, in seconds, if a runtime log was supplied
	pub runtime_secs: Option<f64>,

	/// Accuracy of the predictions
	pub accuracy: AccuracyData,

	/// Accuracy of the cold (inverse) predictions, if a cold trace was supplied
	pub cold_accuracy: Option<AccuracyData>,
}

/// Accuracy data
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AccuracyData {
	/// Total predictions evaluated
	pub total_predictions: u64,

	/// Per-width results, in evaluation order
	pub windows: Vec<WindowAccuracyData>,
}

impl AccuracyData {
	/// Builds accuracy data from evaluation results
	pub fn from_results(results: &EvalResults) -> Self {
		Self {
			total_predictions: results.total_predictions,
			windows:           results
				.windows
				.iter()
				.map(|window| WindowAccuracyData {
					window:           window.width,
					hits:             window.hits,
					misses:           window.misses,
					accuracy_percent: window.accuracy_percent(),
				})
				.collect(),
		}
	}

	/// Builds accuracy data from evaluation results of an inverse predictor.
	///
	/// A cold prediction is correct when the address is *not* accessed
	/// within the window, so hits and misses swap.
	pub fn from_inverse_results(results: &EvalResults) -> Self {
		Self {
			total_predictions: results.total_predictions,
			windows:           results
				.windows
				.iter()
				.map(|window| WindowAccuracyData {
					window:           window.width,
					hits:             window.misses,
					misses:           window.hits,
					accuracy_percent: 100.0 - window.accuracy_percent(),
				})
				.collect(),
		}
	}
}

/// Accuracy data for a single window width
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WindowAccuracyData {
	/// Window width, in normalized trace-time units
	pub window: f64,

	/// Correct predictions
	pub hits: u64,

	/// Incorrect predictions
	pub misses: u64,

	/// Accuracy, as a percentage
	pub accuracy_percent: f64,
}

/// Output data for a latency measurement
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct LatencyData {
	/// Total runtime of the traced run, in seconds
	pub runtime_secs: f64,

	/// Matched samples, ascending by begin time
	pub samples: Vec<LatencySampleData>,
}

impl LatencyData {
	/// Builds latency data from matched samples
	pub fn from_samples(runtime_secs: f64, samples: &[LatencySample]) -> Self {
		Self {
			runtime_secs,
			samples: samples
				.iter()
				.map(|sample| LatencySampleData {
					begin_time: sample.begin_time,
					latency:    sample.latency,
				})
				.collect(),
		}
	}
}

/// A matched latency sample
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct LatencySampleData {
	/// Time the operation began, in seconds
	pub begin_time: f64,

	/// Time until the matching completion, in seconds
	pub latency: f64,
}

#[cfg(test)]
mod test {
	use {super::*, crate::eval::WindowAccuracy};

	#[test]
	fn inverse_results_swap_hits_and_misses() {
		let results = EvalResults {
			total_predictions: 4,
			windows:           vec![WindowAccuracy {
				width:  0.5,
				hits:   3,
				misses: 1,
			}],
		};

		let data = AccuracyData::from_results(&results);
		assert_eq!(data.windows[0].hits, 3);
		assert_eq!(data.windows[0].accuracy_percent, 75.0);

		let inverse = AccuracyData::from_inverse_results(&results);
		assert_eq!(inverse.windows[0].hits, 1);
		assert_eq!(inverse.windows[0].misses, 3);
		assert_eq!(inverse.windows[0].accuracy_percent, 25.0);
	}
}
