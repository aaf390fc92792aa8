mod timestamp;

use image::RgbImage;

pub use timestamp::{FrameRate, FrameRateError, Timestamp};

/// A decoded sample of a video.
#[derive(Clone, Debug)]
pub struct Frame {
    timestamp: Timestamp,
    image: RgbImage,
}

impl Frame {
    pub fn new(timestamp: Timestamp, image: RgbImage) -> Self {
        Self { timestamp, image }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}
