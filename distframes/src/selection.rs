//! Decides which sampled frames are distinct enough to keep.
//!
//! Every sample is compared against a single reference. Normally that is the last kept
//! frame. Once a sample has been skipped a fallback reference is armed, and it stays
//! armed through consecutive skips until the next frame is kept. The fallback is always
//! assigned from `last_kept`, so the reference is never older than the two most recently
//! kept frames.

use std::{fmt, rc::Rc};

use distframes_common::{HistogramCorrelation, ScoreError, Scorer, Threshold};

use crate::frame::{Frame, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Last,
    Fallback,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Last => write!(f, "last"),
            ReferenceKind::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Comparison {
    pub reference: ReferenceKind,
    pub reference_timestamp: Timestamp,
    pub similarity: f64,
}

#[derive(Clone, Debug)]
pub enum Decision {
    Save(Rc<Frame>),
    Skip,
}

#[derive(Clone, Debug)]
pub struct Verdict {
    pub timestamp: Timestamp,
    pub decision: Decision,
    /// Absent for the very first sample, which is kept without looking at it.
    pub comparison: Option<Comparison>,
}

impl Verdict {
    pub fn is_save(&self) -> bool {
        matches!(self.decision, Decision::Save(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.is_save() { "SAVE" } else { "SKIP" };
        write!(f, "[{:.1}s] ", self.timestamp.seconds())?;
        match &self.comparison {
            None => write!(f, "First frame -> {action}"),
            Some(Comparison {
                reference,
                reference_timestamp,
                similarity,
            }) => write!(
                f,
                "vs {reference}@{:.1}s | sim={similarity:.3} -> {action}",
                reference_timestamp.seconds()
            ),
        }
    }
}

pub struct Selection<S = HistogramCorrelation> {
    scorer: S,
    threshold: Threshold,
    last_kept: Option<Rc<Frame>>,
    fallback: Option<Rc<Frame>>,
}

impl Selection<HistogramCorrelation> {
    pub fn new(threshold: Threshold) -> Self {
        Self::with_scorer(HistogramCorrelation, threshold)
    }
}

impl<S: Scorer> Selection<S> {
    pub fn with_scorer(scorer: S, threshold: Threshold) -> Self {
        Self {
            scorer,
            threshold,
            last_kept: None,
            fallback: None,
        }
    }

    pub fn last_kept(&self) -> Option<&Frame> {
        self.last_kept.as_deref()
    }

    pub fn fallback(&self) -> Option<&Frame> {
        self.fallback.as_deref()
    }

    /// The frame the next sample will be compared against.
    pub fn active_reference(&self) -> Option<(ReferenceKind, &Frame)> {
        match (&self.fallback, &self.last_kept) {
            (Some(fallback), _) => Some((ReferenceKind::Fallback, fallback)),
            (None, Some(last)) => Some((ReferenceKind::Last, last)),
            (None, None) => None,
        }
    }

    /// Feeds the next sample. Samples must arrive in increasing timestamp order.
    pub fn observe(&mut self, frame: Frame) -> Result<Verdict, ScoreError> {
        let timestamp = frame.timestamp();
        debug_assert!(self
            .last_kept
            .as_ref()
            .map_or(true, |last| last.timestamp().index() < timestamp.index()));

        let Some((reference, reference_frame)) = self.active_reference() else {
            let frame = Rc::new(frame);
            self.last_kept = Some(Rc::clone(&frame));
            self.fallback = None;
            return Ok(Verdict {
                timestamp,
                decision: Decision::Save(frame),
                comparison: None,
            });
        };

        let reference_timestamp = reference_frame.timestamp();
        let similarity = self
            .scorer
            .score(reference_frame.image(), frame.image())?;
        let comparison = Some(Comparison {
            reference,
            reference_timestamp,
            similarity,
        });

        let decision = if self.threshold.is_distinct(similarity) {
            let frame = Rc::new(frame);
            self.fallback = None;
            self.last_kept = Some(Rc::clone(&frame));
            Decision::Save(frame)
        } else {
            self.fallback = self.last_kept.clone();
            Decision::Skip
        };

        Ok(Verdict {
            timestamp,
            decision,
            comparison,
        })
    }
}
