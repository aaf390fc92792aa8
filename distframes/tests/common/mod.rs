// NOTE: every test will complain about the functions it doesn't use
#![allow(unused)]

use std::{
    cell::Cell,
    path::{Path, PathBuf},
    rc::Rc,
};

use distframes::{
    extraction::ExtractError,
    sink::FrameSink,
    source::VideoSource,
    synthetic::SyntheticVideo,
    Frame, FrameRate, Timestamp,
};
use distframes_common::{colorhist, ScoreError, Threshold};
use image::RgbImage;

/// Returns cargo's tmpdir
pub fn cargo_tmpdir() -> PathBuf {
    PathBuf::from(option_env!("CARGO_TARGET_TMPDIR").expect("no cargo tmpdir???"))
}

pub fn threshold(t: f64) -> Threshold {
    Threshold::new(t).expect("valid threshold")
}

/// Remembers what it was asked to persist instead of writing anything.
#[derive(Default)]
pub struct RecordingSink {
    pub persisted: Vec<(Timestamp, PathBuf)>,
}

impl FrameSink for RecordingSink {
    fn persist(&mut self, frame: &Frame, destination: &Path) -> Result<(), ExtractError> {
        self.persisted
            .push((frame.timestamp(), destination.to_path_buf()));
        Ok(())
    }
}

/// Fails every read from frame `fail_from` and onward, and tells when it has been dropped.
pub struct BrokenVideo {
    pub video: SyntheticVideo,
    pub fail_from: u64,
    pub dropped: Rc<Cell<bool>>,
}

impl BrokenVideo {
    pub fn new(video: SyntheticVideo, fail_from: u64) -> Self {
        Self {
            video,
            fail_from,
            dropped: Rc::new(Cell::new(false)),
        }
    }
}

impl VideoSource for BrokenVideo {
    fn frame_rate(&self) -> Result<FrameRate, ExtractError> {
        self.video.frame_rate()
    }

    fn read_at(&mut self, timestamp: &Timestamp) -> Result<Option<RgbImage>, ExtractError> {
        if timestamp.index() >= self.fail_from {
            return Err(ExtractError::Decode {
                timestamp: *timestamp,
                source: "corrupt packet".into(),
            });
        }
        self.video.read_at(timestamp)
    }
}

impl Drop for BrokenVideo {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

/// The real scorer, but counting how many times it was used.
pub fn counting_scorer(
    calls: Rc<Cell<usize>>,
) -> impl Fn(&RgbImage, &RgbImage) -> Result<f64, ScoreError> {
    move |a: &RgbImage, b: &RgbImage| -> Result<f64, ScoreError> {
        calls.set(calls.get() + 1);
        colorhist::similarity(a, b)
    }
}

pub fn assert_strictly_increasing(seconds: &[f64]) {
    assert!(
        seconds.windows(2).all(|w| w[0] < w[1]),
        "not increasing: {seconds:?}"
    );
}
