use image::RgbImage;

use crate::{
    extraction::ExtractError,
    frame::{FrameRate, Timestamp},
};

/// Somewhere frames can be sampled from. The stream is released when the source is
/// dropped.
pub trait VideoSource {
    /// Fails with [`ExtractError::SourceUnavailable`] when no usable rate is known, as
    /// there is then no way to tell how far apart the samples should be.
    fn frame_rate(&self) -> Result<FrameRate, ExtractError>;

    /// Reads the frame at `timestamp`, or the first one after it. `None` means that the
    /// stream has ended.
    fn read_at(&mut self, timestamp: &Timestamp) -> Result<Option<RgbImage>, ExtractError>;
}

impl<V: VideoSource + ?Sized> VideoSource for &mut V {
    fn frame_rate(&self) -> Result<FrameRate, ExtractError> {
        (**self).frame_rate()
    }

    fn read_at(&mut self, timestamp: &Timestamp) -> Result<Option<RgbImage>, ExtractError> {
        (**self).read_at(timestamp)
    }
}
