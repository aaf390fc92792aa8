use image::{GenericImageView, ImageBuffer, Pixel, Rgb, RgbImage};
use rand::Rng;

pub fn filled(width: u32, height: u32, red: u8, green: u8, blue: u8) -> RgbImage {
    ImageBuffer::from_pixel(width, height, Rgb([red, green, blue]))
}

/// Adds uniformly distributed noise in `0..=max` to every channel, saturating at white.
pub fn add_noise(img: &mut RgbImage, rng: &mut impl Rng, max: u8) {
    if max == 0 {
        return;
    }
    img.pixels_mut().for_each(|p| {
        p.apply(|channel| channel.saturating_add(rng.gen_range(0..=max)))
    });
}

pub fn is_img_empty<T>(img: &T) -> bool
where
    T: GenericImageView,
{
    img.width() == 0 || img.height() == 0
}
