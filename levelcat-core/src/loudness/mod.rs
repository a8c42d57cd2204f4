//! Loudness measurement: analysis invocation and report parsing.

pub mod measure;
pub mod report;

pub use measure::{build_measure_command, measure_loudness};
pub use report::LoudnessReport;
