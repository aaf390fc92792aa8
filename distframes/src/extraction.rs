use std::path::PathBuf;

use distframes_common::{HistogramCorrelation, ScoreError, Scorer, Threshold};

use crate::{
    frame::{Frame, Timestamp},
    selection::{Decision, Selection},
    sink::FrameSink,
    source::VideoSource,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("the video source is unavailable")]
    SourceUnavailable(#[source] BoxError),
    #[error("failed to read the sample at {timestamp}")]
    Decode {
        timestamp: Timestamp,
        #[source]
        source: BoxError,
    },
    #[error("failed to process the frame at {timestamp}")]
    ImageProcessing {
        timestamp: Timestamp,
        #[source]
        source: ScoreError,
    },
    #[error("failed to write a kept frame to {}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    pub threshold: Threshold,
    pub output_dir: PathBuf,
    /// Decides the image format of the kept frames
    pub extension: String,
}

impl ExtractionConfig {
    pub fn new(threshold: Threshold, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            threshold,
            output_dir: output_dir.into(),
            extension: "jpg".to_string(),
        }
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn destination(&self, timestamp: &Timestamp) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", timestamp.file_stem(), self.extension))
    }
}

#[derive(Clone, Debug)]
pub struct KeptFrame {
    pub timestamp: Timestamp,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct ExtractionSummary {
    /// Number of frames read from the source
    pub samples: usize,
    /// Number of similarity computations made
    pub comparisons: usize,
    pub kept: Vec<KeptFrame>,
}

impl ExtractionSummary {
    pub fn kept_timestamps(&self) -> Vec<f64> {
        self.kept.iter().map(|k| k.timestamp.seconds()).collect()
    }
}

/// Runs one pass over a video. Consumed by [`Extractor::run`] so that no reference
/// frames survive between videos.
pub struct Extractor<S = HistogramCorrelation> {
    selection: Selection<S>,
    config: ExtractionConfig,
}

impl Extractor<HistogramCorrelation> {
    pub fn new(config: ExtractionConfig) -> Self {
        Self::with_scorer(config, HistogramCorrelation)
    }
}

impl<S: Scorer> Extractor<S> {
    pub fn with_scorer(config: ExtractionConfig, scorer: S) -> Self {
        Self {
            selection: Selection::with_scorer(scorer, config.threshold),
            config,
        }
    }

    pub fn run(
        mut self,
        mut source: impl VideoSource,
        mut sink: impl FrameSink,
    ) -> Result<ExtractionSummary, ExtractError> {
        let rate = source.frame_rate()?;
        let step = rate.sample_step();
        log::info!(
            "Video FPS: {rate}, sampling every {step} frames, threshold {}",
            self.config.threshold
        );

        let mut summary = ExtractionSummary::default();
        let mut index = 0;
        loop {
            let timestamp = Timestamp::new(index, rate);
            let Some(image) = source.read_at(&timestamp)? else {
                log::debug!("End of stream at {timestamp}");
                break;
            };
            summary.samples += 1;

            let verdict = self
                .selection
                .observe(Frame::new(timestamp, image))
                .map_err(|source| ExtractError::ImageProcessing { timestamp, source })?;
            log::info!("{verdict}");

            if verdict.comparison.is_some() {
                summary.comparisons += 1;
            }

            if let Decision::Save(frame) = &verdict.decision {
                let path = self.config.destination(&timestamp);
                sink.persist(frame, &path)?;
                summary.kept.push(KeptFrame { timestamp, path });
            }

            index += step;
        }

        log::info!("Done. Extracted {} frames.", summary.kept.len());
        Ok(summary)
    }
}

/// Opens the video at `video` with ffmpeg and writes all kept frames to the output
/// directory of `config`, which must exist.
#[cfg(feature = "ffmpeg")]
pub fn extract_frames(
    video: impl AsRef<std::path::Path>,
    config: ExtractionConfig,
) -> Result<ExtractionSummary, ExtractError> {
    let video = video.as_ref();
    let source = crate::frame_extractor::FrameExtractor::open(video)?;
    log::info!("Extracting frames from {}", video.display());
    Extractor::new(config).run(source, crate::sink::ImageDirSink)
}
