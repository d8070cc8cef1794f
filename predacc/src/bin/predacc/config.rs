//! Configuration

/// Configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Progress output period (in seconds)
	#[serde(default = "default_progress_period_secs")]
	pub progress_period_secs: f64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			progress_period_secs: default_progress_period_secs(),
		}
	}
}

/// Default progress output period
fn default_progress_period_secs() -> f64 {
	1.0
}
