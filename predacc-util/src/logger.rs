//! Logger

// Imports
use {
	std::{fs, io, path::Path, sync::Arc},
	tracing_subscriber::{prelude::*, EnvFilter},
};

/// Pre-initialization logging
pub mod pre_init {
	// Imports
	use std::sync::Mutex;

	/// Messages emitted before the logger was initialized
	static MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

	/// Buffers a debug message until [`init`](super::init) installs the subscriber
	pub fn debug(msg: String) {
		let mut messages = MESSAGES.lock().expect("Poisoned");
		messages.push(msg);
	}

	/// Emits all buffered messages through `tracing`
	pub(super) fn flush() {
		let mut messages = MESSAGES.lock().expect("Poisoned");
		for msg in messages.drain(..) {
			tracing::debug!("{msg}");
		}
	}
}

/// Initializes the global logger.
///
/// Logs to stderr, filtered by `RUST_LOG`, and, if `log_file` is given,
/// to it, filtered by `RUST_LOG_FILE`.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	// Console layer
	let console_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_filter(self::env_filter("RUST_LOG", "info"));

	// File layer, if requested.
	// Note: If we can't create the file, we only log to console.
	let file_layer = log_file.and_then(|path| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(path);

		match file {
			Ok(file) => {
				let layer = tracing_subscriber::fmt::layer()
					.with_ansi(false)
					.with_writer(Arc::new(file))
					.with_filter(self::env_filter("RUST_LOG_FILE", "debug"));
				Some(layer)
			},
			Err(err) => {
				eprintln!("Unable to create log file {path:?}: {err}");
				None
			},
		}
	});

	tracing_subscriber::registry()
		.with(console_layer)
		.with(file_layer)
		.init();

	// Then emit anything buffered before we were initialized
	self::pre_init::flush();
}

/// Returns the filter from env variable `env`, or `default` if unset
fn env_filter(env: &str, default: &str) -> EnvFilter {
	EnvFilter::try_from_env(env).unwrap_or_else(|_| EnvFilter::new(default))
}
