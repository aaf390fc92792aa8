#[allow(clippy::module_inception)]
pub mod frame_extractor;

pub use frame_extractor::FrameExtractor;
pub use frame_extractor::Result;
