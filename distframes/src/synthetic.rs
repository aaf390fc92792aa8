//! Videos rendered on the fly, made of solid coloured scenes.

use distframes_common::utils::imgutils;
use image::{Rgb, RgbImage};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    extraction::ExtractError,
    frame::{FrameRate, Timestamp},
    source::VideoSource,
};

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

#[derive(Clone, Debug)]
struct Scene {
    frames: u64,
    color: Rgb<u8>,
    noise: u8,
}

#[derive(Clone, Debug)]
pub struct SyntheticVideo {
    fps: u32,
    width: u32,
    height: u32,
    seed: u64,
    scenes: Vec<Scene>,
    reads: usize,
}

impl SyntheticVideo {
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            width: 64,
            height: 48,
            seed: 0,
            scenes: Vec::new(),
            reads: 0,
        }
    }

    /// Five seconds: red until 1.5s, red with a little noise until 3s, then blue.
    pub fn two_scenes(fps: u32) -> Self {
        let fps64 = fps as u64;
        Self::new(fps)
            .scene(3 * fps64 / 2, RED, 0)
            .scene(3 * fps64 - 3 * fps64 / 2, RED, 2)
            .scene(2 * fps64, BLUE, 0)
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Appends `frames` frames of `color`, every channel raised by up to `noise`.
    pub fn scene(mut self, frames: u64, color: Rgb<u8>, noise: u8) -> Self {
        self.scenes.push(Scene {
            frames,
            color,
            noise,
        });
        self
    }

    pub fn total_frames(&self) -> u64 {
        self.scenes.iter().map(|s| s.frames).sum()
    }

    /// How many frames have been handed out.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn render(&self, index: u64) -> Option<RgbImage> {
        let mut first = 0;
        let scene = self.scenes.iter().find(|scene| {
            first += scene.frames;
            index < first
        })?;

        let Rgb([red, green, blue]) = scene.color;
        let mut img = imgutils::filled(self.width, self.height, red, green, blue);
        let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(index));
        imgutils::add_noise(&mut img, &mut rng, scene.noise);
        Some(img)
    }
}

impl VideoSource for SyntheticVideo {
    fn frame_rate(&self) -> Result<FrameRate, ExtractError> {
        let fps = i32::try_from(self.fps)
            .map_err(|e| ExtractError::SourceUnavailable(e.into()))?;
        FrameRate::new(fps, 1).map_err(|e| ExtractError::SourceUnavailable(e.into()))
    }

    fn read_at(&mut self, timestamp: &Timestamp) -> Result<Option<RgbImage>, ExtractError> {
        let img = self.render(timestamp.index());
        if img.is_some() {
            self.reads += 1;
        }
        Ok(img)
    }
}
