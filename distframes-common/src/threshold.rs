use std::{fmt, str::FromStr};

/// A similarity ceiling. Two images scoring strictly below it are distinct enough to
/// both be kept.
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq)]
pub struct Threshold(f64);

#[derive(thiserror::Error, Debug)]
#[error("not a valid threshold, expected a number within 0.0..=1.0")]
pub struct ThresholdError;

impl Threshold {
    pub const MIN: Self = Threshold(0.0);
    pub const MAX: Self = Threshold(1.0);

    pub fn new(float: f64) -> Result<Self, ThresholdError> {
        if (0.0..=1.0).contains(&float) {
            Ok(Threshold(float))
        } else {
            Err(ThresholdError)
        }
    }

    pub fn is_distinct(self, similarity: f64) -> bool {
        similarity < self.0
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num: f64 = s.trim().parse().map_err(|_| ThresholdError)?;
        Self::new(num)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
