use std::path::Path;

use image::ImageFormat;

use crate::{extraction::ExtractError, frame::Frame};

#[derive(thiserror::Error, Debug)]
#[error("no known image format has the extension {0:?}")]
pub struct UnknownExtension(String);

/// Checks that kept frames can be written with `extension`, e.g. `jpg` or `png`.
pub fn image_extension(extension: &str) -> Result<String, UnknownExtension> {
    let extension = extension.trim_start_matches('.');
    match ImageFormat::from_extension(extension) {
        Some(_) => Ok(extension.to_string()),
        None => Err(UnknownExtension(extension.to_string())),
    }
}

/// Receives every kept frame.
pub trait FrameSink {
    fn persist(&mut self, frame: &Frame, destination: &Path) -> Result<(), ExtractError>;
}

impl<K: FrameSink + ?Sized> FrameSink for &mut K {
    fn persist(&mut self, frame: &Frame, destination: &Path) -> Result<(), ExtractError> {
        (**self).persist(frame, destination)
    }
}

/// Encodes kept frames as image files. The format is picked from the extension of the
/// destination.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDirSink;

impl FrameSink for ImageDirSink {
    fn persist(&mut self, frame: &Frame, destination: &Path) -> Result<(), ExtractError> {
        log::debug!("Writing {}", destination.display());
        frame
            .image()
            .save(destination)
            .map_err(|source| ExtractError::Persistence {
                path: destination.to_path_buf(),
                source,
            })
    }
}
