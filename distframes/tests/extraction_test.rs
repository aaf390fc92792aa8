mod common;

use std::{cell::Cell, rc::Rc};

use common::{
    assert_strictly_increasing, counting_scorer, threshold, BrokenVideo, RecordingSink,
};
use distframes::{
    extraction::{ExtractError, ExtractionConfig, Extractor},
    sink::ImageDirSink,
    synthetic::{SyntheticVideo, BLUE, RED},
};

fn run(video: SyntheticVideo, t: f64) -> Result<distframes::ExtractionSummary, ExtractError> {
    let config = ExtractionConfig::new(threshold(t), "out");
    Extractor::new(config).run(video, RecordingSink::default())
}

#[test]
fn red_then_blue_keeps_two() {
    let summary = run(SyntheticVideo::two_scenes(10), 0.65).unwrap();
    assert_eq!(5, summary.samples);
    assert_eq!(4, summary.comparisons);
    assert_eq!(vec![0.0, 3.0], summary.kept_timestamps());
}

#[test]
fn stricter_threshold_keeps_more() {
    let loose = run(SyntheticVideo::two_scenes(10), 0.65).unwrap();
    let strict = run(SyntheticVideo::two_scenes(10), 0.9).unwrap();
    assert!(strict.kept.len() >= loose.kept.len());
    // the noisy red part is now different enough from the clean red
    assert_eq!(vec![0.0, 2.0, 3.0], strict.kept_timestamps());
}

#[test]
fn threshold_monotonicity() {
    let counts: Vec<usize> = [0.0, 0.25, 0.5, 0.65, 0.8, 0.9, 0.95, 1.0]
        .into_iter()
        .map(|t| run(SyntheticVideo::two_scenes(10).seed(3), t).unwrap().kept.len())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{counts:?}");
}

#[test]
fn first_frame_kept_and_increasing() {
    for fps in [1, 4, 10, 25] {
        for t in [0.3, 0.65, 0.9] {
            let summary = run(SyntheticVideo::two_scenes(fps), t).unwrap();
            assert_eq!(Some(0.0), summary.kept_timestamps().first().copied());
            assert_strictly_increasing(&summary.kept_timestamps());
        }
    }
}

#[test]
fn identical_frames_keep_one_even_at_max_threshold() {
    let video = SyntheticVideo::new(10).scene(60, BLUE, 0);
    let summary = run(video, 1.0).unwrap();
    assert_eq!(6, summary.samples);
    assert_eq!(vec![0.0], summary.kept_timestamps());
}

#[test]
fn single_sample_does_not_compare() {
    let calls = Rc::new(Cell::new(0));
    let video = SyntheticVideo::new(10).scene(5, RED, 0);
    let config = ExtractionConfig::new(threshold(0.65), "out");
    let mut sink = RecordingSink::default();
    let summary = Extractor::with_scorer(config, counting_scorer(Rc::clone(&calls)))
        .run(video, &mut sink)
        .unwrap();

    assert_eq!(1, summary.samples);
    assert_eq!(0, summary.comparisons);
    assert_eq!(0, calls.get());
    assert_eq!(1, sink.persisted.len());
    assert_eq!(0.0, sink.persisted[0].0.seconds());
}

#[test]
fn zero_fps_is_unavailable() {
    let mut video = SyntheticVideo::new(0).scene(50, RED, 0);
    let mut sink = RecordingSink::default();
    let config = ExtractionConfig::new(threshold(0.65), "out");
    let result = Extractor::new(config).run(&mut video, &mut sink);

    assert!(matches!(result, Err(ExtractError::SourceUnavailable(_))));
    assert!(sink.persisted.is_empty());
    assert_eq!(0, video.reads());
}

#[test]
fn empty_video_keeps_nothing() {
    let summary = run(SyntheticVideo::new(10), 0.65).unwrap();
    assert_eq!(0, summary.samples);
    assert!(summary.kept.is_empty());
}

#[test]
fn empty_frames_abort_the_pass() {
    let video = SyntheticVideo::new(10).size(0, 0).scene(30, RED, 0);
    let result = run(video, 0.65);
    assert!(matches!(
        result,
        Err(ExtractError::ImageProcessing { timestamp, .. }) if timestamp.seconds() == 1.0
    ));
}

#[test]
fn writes_images_named_by_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExtractionConfig::new(threshold(0.65), dir.path()).extension("png");
    let summary = Extractor::new(config)
        .run(SyntheticVideo::two_scenes(10), ImageDirSink)
        .unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(vec!["frame_0.00.png", "frame_3.00.png"], names);
    assert!(summary.kept.iter().all(|k| k.path.is_file()));

    let blue = image::open(dir.path().join("frame_3.00.png")).unwrap().to_rgb8();
    assert_eq!(BLUE, *blue.get_pixel(0, 0));
}

#[test]
fn failing_sink_aborts_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExtractionConfig::new(threshold(0.65), dir.path().join("missing"));
    let result = Extractor::new(config).run(SyntheticVideo::two_scenes(10), ImageDirSink);
    assert!(matches!(result, Err(ExtractError::Persistence { .. })));
}

#[test]
fn decode_failure_aborts_and_releases_the_source() {
    let video = BrokenVideo::new(SyntheticVideo::two_scenes(10), 30);
    let dropped = Rc::clone(&video.dropped);
    let mut sink = RecordingSink::default();
    let config = ExtractionConfig::new(threshold(0.9), "out");
    let result = Extractor::new(config).run(video, &mut sink);

    assert!(matches!(
        result,
        Err(ExtractError::Decode { timestamp, .. }) if timestamp.seconds() == 3.0
    ));
    let persisted: Vec<f64> = sink.persisted.iter().map(|(ts, _)| ts.seconds()).collect();
    assert_eq!(vec![0.0, 2.0], persisted);
    assert!(dropped.get());
}
