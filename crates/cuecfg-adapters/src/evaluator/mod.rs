//! Evaluator adapters.

mod cue;

pub use cue::{CueEvaluator, DEFAULT_PROGRAM};
