//! Prediction-accuracy evaluation for `pebs` memory-access traces (`predacc`)

// Modules
pub mod data;
pub mod eval;
pub mod latency;
pub mod log;
pub mod normalize;
pub mod trace;
pub mod window;

// Exports
pub use self::{
	eval::{EvalResults, Evaluator},
	normalize::NormalizedTrace,
	trace::{Trace, TraceReader},
	window::SlidingWindow,
};
