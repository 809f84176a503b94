use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::sequence_metadata::SequenceMetadata;
use crate::video::domain::frame_reader::FrameReader;

/// Adapts a single image, or a directory of images, to [`FrameReader`].
///
/// A directory is read as one frame per image file, ordered by file name.
/// Frames are decoded lazily with the `image` crate.
pub struct ImageSequenceReader {
    paths: Option<Vec<PathBuf>>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self { paths: None }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn decode(path: &Path, index: usize) -> Result<Frame, Box<dyn std::error::Error>> {
    let image = image::open(path)
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?
        .to_rgb8();
    Ok(Frame::from_rgb_image(image, index))
}

impl FrameReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<SequenceMetadata, Box<dyn std::error::Error>> {
        let paths = if path.is_dir() {
            list_frames(path)?
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(format!("input not found: {}", path.display()).into());
        };
        let first = paths
            .first()
            .ok_or_else(|| format!("no image frames in {}", path.display()))?;
        let (width, height) = image::image_dimensions(first)?;

        let metadata = SequenceMetadata {
            width,
            height,
            total_frames: paths.len(),
            source_path: Some(path.to_path_buf()),
        };
        self.paths = Some(paths);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.paths.take() {
            Some(paths) => Box::new(
                paths
                    .into_iter()
                    .enumerate()
                    .map(|(index, path)| decode(&path, index)),
            ),
            None => Box::new(std::iter::once(Err(
                "ImageSequenceReader: not opened".into()
            ))),
        }
    }

    fn close(&mut self) {
        self.paths = None;
    }
}
