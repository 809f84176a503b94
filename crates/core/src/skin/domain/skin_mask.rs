use image::GrayImage;

use crate::shared::constants::{BACKGROUND, SKIN};

/// Binary skin mask with the same dimensions as its source frame.
///
/// Pixels hold either [`SKIN`] or [`BACKGROUND`]. A mask lives for one
/// frame only.
#[derive(Clone, Debug, PartialEq)]
pub struct SkinMask {
    image: GrayImage,
}

impl SkinMask {
    /// Wraps a grayscale image, mapping every non-zero pixel to [`SKIN`].
    pub fn from_gray(mut image: GrayImage) -> Self {
        for px in image.pixels_mut() {
            px.0[0] = if px.0[0] == BACKGROUND { BACKGROUND } else { SKIN };
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

#[cfg(test)]
impl SkinMask {
    pub(crate) fn is_skin(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == SKIN
    }

    pub(crate) fn skin_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] == SKIN).count()
    }
}
