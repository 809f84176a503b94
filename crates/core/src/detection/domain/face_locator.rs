use image::GrayImage;

use crate::shared::face_region::FaceRegion;

/// Domain interface for locating faces in a grayscale frame.
///
/// Zero or more rectangles per call, in no particular order. `&mut self`
/// leaves room for locators that keep state between frames.
pub trait FaceLocator: Send {
    fn locate(&mut self, gray: &GrayImage) -> Result<Vec<FaceRegion>, Box<dyn std::error::Error>>;
}
