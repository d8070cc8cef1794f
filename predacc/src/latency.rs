//! Migration latency matching.
//!
//! Matches each "began" event to the nearest strictly-later "completed"
//! event on the same address, consuming each completion at most once.
//! Per-address cursors only move forward, the same discipline as the
//! sliding window but with a single cursor per key instead of a multiset.

// Imports
use {
	crate::log::LogEvent,
	std::collections::{BTreeMap, HashMap},
};

/// A matched begin/completion pair
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct LatencySample {
	/// Time the operation began, in seconds
	pub begin_time: f64,

	/// Time until the matching completion, in seconds
	pub latency: f64,
}

/// Matches each begin event to the nearest strictly-later completion on the
/// same address.
///
/// Begins with no remaining future completion yield no sample. The returned
/// samples are ascending by begin time.
pub fn match_completions(begins: &[LogEvent], completions: &[LogEvent]) -> Vec<LatencySample> {
	// Group completion times by address
	let mut completions_by_addr = HashMap::<u64, Vec<f64>>::new();
	for event in completions {
		completions_by_addr.entry(event.addr).or_default().push(event.time);
	}
	for times in completions_by_addr.values_mut() {
		times.sort_by(f64::total_cmp);
	}

	// Then match begins against them, consuming each completion at most once
	let mut cursors = HashMap::<u64, usize>::new();
	let mut samples = Vec::new();
	for begin in begins {
		let times = match completions_by_addr.get(&begin.addr) {
			Some(times) => times,
			None => continue,
		};
		let cursor = cursors.entry(begin.addr).or_insert(0);

		// Advance past completions at or before the begin time
		while *cursor < times.len() && times[*cursor] <= begin.time {
			*cursor += 1;
		}
		if *cursor >= times.len() {
			continue;
		}

		samples.push(LatencySample {
			begin_time: begin.time,
			latency:    times[*cursor] - begin.time,
		});
		*cursor += 1;
	}

	samples.sort_by(|lhs, rhs| lhs.begin_time.total_cmp(&rhs.begin_time));
	samples
}

/// Bins samples by begin time and averages the latencies per bin.
///
/// Bins are `bin_size` wide, from the first occupied bin up to
/// `span_end`; bins without samples average to 0.
///
/// # Panics
/// Panics if `bin_size` isn't positive.
pub fn bin_averages(samples: &[LatencySample], span_end: f64, bin_size: f64) -> Vec<(f64, f64)> {
	assert!(bin_size > 0.0, "Bin size must be positive: {bin_size}");

	if samples.is_empty() {
		return vec![];
	}

	let mut bins = BTreeMap::<i64, (f64, usize)>::new();
	for sample in samples {
		let bin = (sample.begin_time / bin_size).floor() as i64;
		let (sum, count) = bins.entry(bin).or_insert((0.0, 0));
		*sum += sample.latency;
		*count += 1;
	}

	let min_bin = *bins.keys().next().expect("Samples aren't empty");
	let max_bin = (span_end / bin_size).ceil() as i64;

	(min_bin..=max_bin)
		.map(|bin| {
			let average = bins.get(&bin).map_or(0.0, |&(sum, count)| sum / count as f64);
			(bin as f64 * bin_size, average)
		})
		.collect()
}
