use std::fmt;

/// Frames per second as reported by the container, e.g. 30000/1001.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct FrameRate {
    numerator: i32,
    denominator: i32,
}

#[derive(thiserror::Error, Debug)]
#[error("the frame rate {numerator}/{denominator} is not usable")]
pub struct FrameRateError {
    numerator: i32,
    denominator: i32,
}

impl FrameRate {
    pub fn new(numerator: i32, denominator: i32) -> Result<Self, FrameRateError> {
        if numerator > 0 && denominator > 0 {
            Ok(Self {
                numerator,
                denominator,
            })
        } else {
            Err(FrameRateError {
                numerator,
                denominator,
            })
        }
    }

    pub fn numerator(self) -> i32 {
        self.numerator
    }

    pub fn denominator(self) -> i32 {
        self.denominator
    }

    pub fn as_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// How many frames to advance to get roughly one sample per second. Rates below
    /// half a frame per second sample every frame.
    pub fn sample_step(self) -> u64 {
        (self.as_f64().round() as u64).max(1)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{:.3}", self.as_f64())
        }
    }
}

/// A sample index together with the frame rate that turns it into a point in time.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Timestamp {
    index: u64,
    rate: FrameRate,
}

impl Timestamp {
    pub fn new(index: u64, rate: FrameRate) -> Self {
        Self { index, rate }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    pub fn seconds(&self) -> f64 {
        self.index as f64 * self.rate.denominator as f64 / self.rate.numerator as f64
    }

    /// Name of the image a kept frame is written to, without extension.
    pub fn file_stem(&self) -> String {
        format!("frame_{:.2}", self.seconds())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut total = self.seconds();

        let subsec = (total.fract() * 1e3).trunc();
        total = total.trunc();

        let hours = (total / 3600.0).trunc();
        total %= 3600.0;

        let minutes = (total / 60.0).trunc();
        total %= 60.0;

        let seconds = total;

        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, seconds, subsec
        )
    }
}
