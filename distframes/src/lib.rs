pub mod extraction;
pub mod frame;
#[cfg(feature = "ffmpeg")]
pub mod frame_extractor;
pub mod selection;
pub mod sink;
pub mod source;
pub mod synthetic;

pub use extraction::{ExtractError, ExtractionConfig, ExtractionSummary, Extractor};
pub use frame::{Frame, FrameRate, Timestamp};
pub use selection::{Decision, Selection, Verdict};
