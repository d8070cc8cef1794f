//! Time normalization.
//!
//! Both traces of an evaluation are rescaled onto a common `[0, 1]` time
//! axis using the joint min/max cycle across the two, so that a window
//! width is a fraction of the full run rather than a raw cycle count.

// Imports
use {
	crate::trace::{Record, Trace, TraceRole},
	itertools::Itertools,
};

/// Trace normalized onto the common time axis
#[derive(Clone, Debug)]
pub struct NormalizedTrace {
	/// Events, ascending by time
	events: Vec<Event>,
}

impl NormalizedTrace {
	/// Creates a normalized trace from events, sorting them by time
	pub fn from_events(mut events: Vec<Event>) -> Self {
		events.sort_by(|lhs, rhs| lhs.time.total_cmp(&rhs.time));
		Self { events }
	}

	/// Returns all events
	pub fn events(&self) -> &[Event] {
		&self.events
	}

	/// Returns the number of events
	pub fn len(&self) -> usize {
		self.events.len()
	}

	/// Returns if the trace has no events
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}
}

/// Normalized access event
#[derive(Clone, Copy, Debug)]
pub struct Event {
	/// Timestamp, in trace-relative units
	pub time: f64,

	/// Record that originated this event
	pub record: Record,
}

/// Error for [`normalize_pair`]
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
	/// A trace had no records
	#[error("The {role} trace has no records")]
	EmptyTrace {
		/// Which trace was empty
		role: TraceRole,
	},

	/// All timestamps across both traces were identical
	#[error("All timestamps across both traces are identical, the time range is degenerate")]
	DegenerateRange,
}

/// Normalizes `observed` and `predicted` onto a common `[0, 1]` time axis.
///
/// Neither input is modified; new traces are returned with each record's
/// cycle mapped to `(cycle - global_min) / (global_max - global_min)`.
pub fn normalize_pair(
	observed: &Trace,
	predicted: &Trace,
) -> Result<(NormalizedTrace, NormalizedTrace), NormalizeError> {
	if observed.is_empty() {
		return Err(NormalizeError::EmptyTrace {
			role: TraceRole::Observed,
		});
	}
	if predicted.is_empty() {
		return Err(NormalizeError::EmptyTrace {
			role: TraceRole::Predicted,
		});
	}

	let (global_min, global_max) = observed
		.records()
		.iter()
		.chain(predicted.records())
		.map(|record| record.cycle)
		.minmax()
		.into_option()
		.expect("Traces aren't empty");
	if global_min == global_max {
		return Err(NormalizeError::DegenerateRange);
	}

	let range = (global_max - global_min) as f64;
	let normalize = |trace: &Trace| {
		// Note: The input is ascending by cycle and the rescale is
		//       monotonic, so the output is ascending by time.
		let events = trace
			.records()
			.iter()
			.map(|&record| Event {
				time: (record.cycle - global_min) as f64 / range,
				record,
			})
			.collect();
		NormalizedTrace { events }
	};

	Ok((normalize(observed), normalize(predicted)))
}

#[cfg(test)]
mod test {
	use {
		super::*,
		crate::trace::{Record, RecordKind},
	};

	/// Creates a record with `cycle` and `addr`
	fn record(cycle: u64, addr: u64) -> Record {
		Record {
			cycle,
			addr,
			ip: 0,
			cpu: 0,
			kind: RecordKind::DramRead,
		}
	}

	/// Returns the times of `trace`
	fn times(trace: &NormalizedTrace) -> Vec<f64> {
		trace.events().iter().map(|event| event.time).collect()
	}

	#[test]
	fn joint_min_max() {
		// Observed spans [10, 20], predicted spans [0, 40]: the joint
		// range is [0, 40], so observed lands on [0.25, 0.5].
		let observed = Trace::from_records(vec![record(10, 0x1), record(20, 0x2)]);
		let predicted = Trace::from_records(vec![record(0, 0x1), record(40, 0x2)]);

		let (observed, predicted) = normalize_pair(&observed, &predicted).expect("Unable to normalize");
		assert_eq!(times(&observed), [0.25, 0.5]);
		assert_eq!(times(&predicted), [0.0, 1.0]);
	}

	#[test]
	fn aux_fields_are_carried_through() {
		let observed = Trace::from_records(vec![Record {
			cycle: 0,
			addr:  0x1000,
			ip:    0x77,
			cpu:   5,
			kind:  RecordKind::Write,
		}]);
		let predicted = Trace::from_records(vec![record(100, 0x2000)]);

		let (observed, _) = normalize_pair(&observed, &predicted).expect("Unable to normalize");
		let event = observed.events()[0];
		assert_eq!(event.record.ip, 0x77);
		assert_eq!(event.record.cpu, 5);
		assert_eq!(event.record.kind, RecordKind::Write);
		assert_eq!(event.record.cycle, 0);
	}

	#[test]
	fn degenerate_range() {
		let observed = Trace::from_records(vec![record(5, 0x1), record(5, 0x2)]);
		let predicted = Trace::from_records(vec![record(5, 0x3)]);

		assert!(matches!(
			normalize_pair(&observed, &predicted),
			Err(NormalizeError::DegenerateRange)
		));
	}

	#[test]
	fn empty_traces() {
		let empty = Trace::from_records(vec![]);
		let trace = Trace::from_records(vec![record(0, 0x1), record(1, 0x2)]);

		assert!(matches!(
			normalize_pair(&empty, &trace),
			Err(NormalizeError::EmptyTrace {
				role: TraceRole::Observed
			})
		));
		assert!(matches!(
			normalize_pair(&trace, &empty),
			Err(NormalizeError::EmptyTrace {
				role: TraceRole::Predicted
			})
		));
	}
}
