//! Runtime log parsing.
//!
//! The traced run emits a text log with lines stamped `[secs.frac]`.
//! We only extract the stamps and a few stamped event lines; everything
//! else in the log is opaque to us.

// Imports
use {anyhow::Context, regex::Regex};

/// Pattern for page promotion requests
pub const MADE_HOT_PATTERN: &str = r"PEBS:\s*Made hot[:\s]*([0-9a-fxA-F]+)";

/// Pattern for completed page migrations
pub const FINISHED_MIGRATION_PATTERN: &str = r"MIG:\s*Finished migration[:\s]*([0-9a-fxA-F]+)";

/// Timed event extracted from a runtime log
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct LogEvent {
	/// Timestamp, in seconds
	pub time: f64,

	/// Address
	pub addr: u64,
}

/// Returns the first and last timestamps of `log`.
///
/// # Errors
/// Returns an error if the log has no stamped lines.
pub fn runtime_span(log: &str) -> Result<(f64, f64), anyhow::Error> {
	let timestamp_regex = self::timestamp_regex();

	let mut timestamps = log
		.lines()
		.filter_map(|line| self::line_timestamp(&timestamp_regex, line));
	let first = timestamps.next().context("No timestamped lines in log")?;
	let last = timestamps.last().unwrap_or(first);

	Ok((first, last))
}

/// Extracts begin and completion events from `log`.
///
/// Each regex must capture the event's hexadecimal address in its first
/// group; only stamped lines are considered. Events are returned in log
/// order, which is ascending by time.
pub fn parse_events(
	log: &str,
	begin_regex: &Regex,
	complete_regex: &Regex,
) -> Result<(Vec<LogEvent>, Vec<LogEvent>), anyhow::Error> {
	let timestamp_regex = self::timestamp_regex();

	let mut begins = Vec::new();
	let mut completions = Vec::new();
	for line in log.lines() {
		let time = match self::line_timestamp(&timestamp_regex, line) {
			Some(time) => time,
			None => continue,
		};

		if let Some(captures) = begin_regex.captures(line) {
			let addr = self::parse_addr(&captures[1])
				.with_context(|| format!("Unable to parse begin event address in line {line:?}"))?;
			begins.push(LogEvent { time, addr });
			continue;
		}

		if let Some(captures) = complete_regex.captures(line) {
			let addr = self::parse_addr(&captures[1])
				.with_context(|| format!("Unable to parse completion event address in line {line:?}"))?;
			completions.push(LogEvent { time, addr });
		}
	}

	Ok((begins, completions))
}

/// Returns the timestamp regex
fn timestamp_regex() -> Regex {
	Regex::new(r"\[([0-9.]+)\]").expect("Invalid timestamp regex")
}

/// Returns the timestamp of `line`, if stamped
fn line_timestamp(timestamp_regex: &Regex, line: &str) -> Option<f64> {
	let captures = timestamp_regex.captures(line)?;
	captures[1].parse().ok()
}

/// Parses a hexadecimal address, with or without a `0x` prefix
fn parse_addr(addr: &str) -> Result<u64, anyhow::Error> {
	let addr = addr.to_lowercase();
	let addr = addr.strip_prefix("0x").unwrap_or(&addr);
	u64::from_str_radix(addr, 16).context("Invalid hexadecimal address")
}

#[cfg(test)]
mod test {
	use super::*;

	const LOG: &str = "\
[0.500123] TMEM: Initialized
some unstamped line
[1.250000] PEBS: Made hot: 0x792975200000
[2.000000] MIG: Finished migration: 0x792975200000
[3.750000] PEBS: Made hot: 0x792976e00000
[9.125000] TMEM: Shutting down
";

	#[test]
	fn runtime_span_first_and_last() {
		let (first, last) = runtime_span(LOG).expect("Unable to parse log");
		assert_eq!(first, 0.500123);
		assert_eq!(last, 9.125);
	}

	#[test]
	fn runtime_span_single_line() {
		let (first, last) = runtime_span("[4.5] only line\n").expect("Unable to parse log");
		assert_eq!(first, 4.5);
		assert_eq!(last, 4.5);
	}

	#[test]
	fn runtime_span_no_stamps() {
		assert!(runtime_span("no stamps here\n").is_err());
	}

	#[test]
	fn parses_events() {
		let begin_regex = Regex::new(MADE_HOT_PATTERN).expect("Invalid pattern");
		let complete_regex = Regex::new(FINISHED_MIGRATION_PATTERN).expect("Invalid pattern");

		let (begins, completions) = parse_events(LOG, &begin_regex, &complete_regex).expect("Unable to parse log");
		assert_eq!(begins, [
			LogEvent {
				time: 1.25,
				addr: 0x7929_7520_0000,
			},
			LogEvent {
				time: 3.75,
				addr: 0x7929_76e0_0000,
			},
		]);
		assert_eq!(completions, [LogEvent {
			time: 2.0,
			addr: 0x7929_7520_0000,
		}]);
	}
}
