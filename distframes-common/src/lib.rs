pub mod bin_common;
pub mod colorhist;
pub mod threshold;

/// For stand-alone functionality that fit comfortably within one file.
pub mod utils;

pub use colorhist::{HistogramCorrelation, ScoreError, Scorer};
pub use threshold::Threshold;
