//! Type definitions for the fraud scoring form

pub mod input;
pub mod prediction;

pub use input::RawInput;
pub use prediction::{PredictionOutcome, PredictionResult, Verdict};
