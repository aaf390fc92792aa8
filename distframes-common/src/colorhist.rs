//! Colour distribution similarity.
//!
//! Both images are converted to 8-bit HSV, a joint hue/saturation histogram is built for
//! each, the histograms are min-max normalized and then correlated. Brightness is not
//! part of the histogram.

use image::{Rgb, RgbImage};

use crate::utils::{
    imgutils,
    math::{correlation, normalize_min_max},
};

/// Hue is halved to fit in a byte, the same way 8-bit HSV usually does it.
pub const HUE_BINS: usize = 180;
pub const SATURATION_BINS: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("the image has no pixels")]
    EmptyImage,
}

/// Something that can tell how alike two images are. Higher is more similar, 1.0 is
/// identical.
pub trait Scorer {
    fn score(&self, reference: &RgbImage, candidate: &RgbImage) -> Result<f64, ScoreError>;
}

impl<F> Scorer for F
where
    F: Fn(&RgbImage, &RgbImage) -> Result<f64, ScoreError>,
{
    fn score(&self, reference: &RgbImage, candidate: &RgbImage) -> Result<f64, ScoreError> {
        self(reference, candidate)
    }
}

/// Correlation of normalized hue/saturation histograms.
#[derive(Clone, Copy, Debug, Default)]
pub struct HistogramCorrelation;

impl Scorer for HistogramCorrelation {
    fn score(&self, reference: &RgbImage, candidate: &RgbImage) -> Result<f64, ScoreError> {
        similarity(reference, candidate)
    }
}

pub fn similarity(a: &RgbImage, b: &RgbImage) -> Result<f64, ScoreError> {
    let mut hist_a = HueSatHistogram::of(a)?;
    let mut hist_b = HueSatHistogram::of(b)?;
    hist_a.normalize();
    hist_b.normalize();
    Ok(hist_a.correlation(&hist_b))
}

#[derive(Clone, Debug, PartialEq)]
pub struct HueSatHistogram {
    bins: Vec<f64>,
}

impl HueSatHistogram {
    pub fn of(img: &RgbImage) -> Result<Self, ScoreError> {
        if imgutils::is_img_empty(img) {
            return Err(ScoreError::EmptyImage);
        }

        let mut bins = vec![0.0; HUE_BINS * SATURATION_BINS];
        for &pixel in img.pixels() {
            let (hue, saturation) = hue_saturation(pixel);
            bins[hue as usize * SATURATION_BINS + saturation as usize] += 1.0;
        }

        Ok(Self { bins })
    }

    pub fn normalize(&mut self) {
        normalize_min_max(&mut self.bins);
    }

    pub fn correlation(&self, other: &Self) -> f64 {
        correlation(&self.bins, &other.bins)
    }
}

/// Hue in `0..180` and saturation in `0..=255`.
pub fn hue_saturation(Rgb([red, green, blue]): Rgb<u8>) -> (u8, u8) {
    let (r, g, b) = (red as f64, green as f64, blue as f64);
    let value = r.max(g).max(b);
    let delta = value - r.min(g).min(b);

    let saturation = if value > 0.0 {
        255.0 * delta / value
    } else {
        0.0
    };

    let degrees = if delta == 0.0 {
        0.0
    } else if value == r {
        60.0 * (g - b) / delta
    } else if value == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let degrees = if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    };

    let hue = (degrees / 2.0).round() as usize % HUE_BINS;
    (hue as u8, saturation.round() as u8)
}
