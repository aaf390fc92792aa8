#![cfg(feature = "ffmpeg")]

mod common;

use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use common::{cargo_tmpdir, threshold, RecordingSink};
use distframes::{
    extraction::{ExtractError, ExtractionConfig, Extractor},
    frame_extractor::{self, FrameExtractor},
    source::VideoSource,
    FrameRate, Timestamp,
};

const TEST_VIDEO_LENGTH_SEC: u64 = 4;

#[test]
fn test_frame_rate() -> frame_extractor::Result<()> {
    let Some(video) = create_test_video() else {
        return Ok(());
    };
    let frames = FrameExtractor::new(video)?;
    let rate = frames.frame_rate()?;
    assert_eq!(FrameRate::new(10, 1)?, rate);
    assert_eq!(10, rate.sample_step());

    let length = frames.approx_length();
    assert!(length > Duration::from_millis(TEST_VIDEO_LENGTH_SEC * 1000 - 200));
    assert!(length < Duration::from_millis(TEST_VIDEO_LENGTH_SEC * 1000 + 200));
    Ok(())
}

#[test]
fn test_read_past_the_end() -> frame_extractor::Result<()> {
    let Some(video) = create_test_video() else {
        return Ok(());
    };
    let mut frames = FrameExtractor::new(video)?;
    let rate = FrameRate::new(10, 1)?;

    let blue = frames
        .read_sample(&Timestamp::new(35, rate))?
        .expect("frame 35 exists");
    let [r, _, b] = blue.get_pixel(10, 10).0;
    assert!(b > 200 && r < 50, "not blue: {:?}", blue.get_pixel(10, 10));

    assert!(frames.read_sample(&Timestamp::new(40, rate))?.is_none());
    Ok(())
}

#[test]
fn test_extract_red_then_blue() {
    let Some(video) = create_test_video() else {
        return;
    };
    let frames = FrameExtractor::open(video).unwrap();
    let config = ExtractionConfig::new(threshold(0.65), "unused");
    let mut sink = RecordingSink::default();
    let summary = Extractor::new(config).run(frames, &mut sink).unwrap();

    assert_eq!(4, summary.samples);
    assert_eq!(vec![0.0, 2.0], summary.kept_timestamps());
    assert_eq!(
        vec![
            PathBuf::from("unused/frame_0.00.jpg"),
            PathBuf::from("unused/frame_2.00.jpg")
        ],
        sink.persisted.into_iter().map(|(_, p)| p).collect::<Vec<_>>()
    );
}

#[test]
fn test_missing_file() {
    let res = FrameExtractor::open(Path::new("/definitely/not/a/video.mkv"));
    assert!(matches!(res, Err(ExtractError::SourceUnavailable(_))));
}

/// Two seconds of red followed by two seconds of blue, at 10 fps. `None` when there is
/// no ffmpeg binary to render it with.
fn create_test_video() -> Option<PathBuf> {
    use std::sync::OnceLock;
    static VIDEO: OnceLock<Option<PathBuf>> = OnceLock::new();

    VIDEO
        .get_or_init(|| {
            let tmpvideo = cargo_tmpdir().join("redblue.mkv");
            std::fs::remove_file(&tmpvideo).ok();
            let status = std::process::Command::new("ffmpeg")
                .args([
                    "-f",
                    "lavfi",
                    "-i",
                    "color=c=red:s=64x48:r=10:d=2",
                    "-f",
                    "lavfi",
                    "-i",
                    "color=c=blue:s=64x48:r=10:d=2",
                    "-filter_complex",
                    "[0:v][1:v]concat=n=2:v=1[out]",
                    "-map",
                    "[out]",
                    tmpvideo.as_os_str().to_str().expect("no probs, probably"),
                ])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .stdin(Stdio::null())
                .status();
            match status {
                Ok(status) if status.success() => Some(tmpvideo),
                _ => {
                    eprintln!("ffmpeg could not render the test video, skipping");
                    None
                }
            }
        })
        .clone()
}
