use image::GrayImage;

use crate::shared::constants::SKIN;
use crate::shared::error::RecognitionError;
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::recognition_config::SkinMaskParams;
use crate::skin::domain::color_statistics::ColorStatistics;
use crate::skin::domain::skin_mask::SkinMask;
use crate::skin::infrastructure::gaussian::blurred_frame;
use crate::skin::infrastructure::morphology::EllipticalMorphology;
use crate::skin::infrastructure::ycrcb::frame_to_ycrcb;

/// Derives an adaptive skin mask from the color statistics of one face.
///
/// Smoothing happens on a working copy, so building twice from the same
/// frame and face yields identical masks.
pub struct SkinMaskBuilder {
    params: SkinMaskParams,
    morphology: EllipticalMorphology,
}

impl SkinMaskBuilder {
    pub fn new(params: SkinMaskParams) -> Self {
        let morphology = EllipticalMorphology::new(params.element_width, params.element_height);
        Self { params, morphology }
    }

    pub fn build(&self, frame: &Frame, face: &FaceRegion) -> Result<SkinMask, RecognitionError> {
        let sample_region = self.sample_region(frame, face)?;

        let smoothed = blurred_frame(frame, self.params.blur_kernel_size, self.params.blur_sigma);
        let ycrcb = frame_to_ycrcb(&smoothed);
        let stats = ColorStatistics::compute(&ycrcb, &sample_region);
        let range = stats.skin_range(&self.params);
        log::debug!(
            "Skin statistics over {sample_region:?}: mean={:?} std={:?} range={range:?}",
            stats.mean,
            stats.std_dev
        );

        let mut raw = GrayImage::new(frame.width(), frame.height());
        for (dst, px) in raw.pixels_mut().zip(ycrcb.data().chunks_exact(CHANNELS)) {
            if range.contains(px) {
                dst.0[0] = SKIN;
            }
        }

        let dilated = self.morphology.dilate(&raw, self.params.dilate_iterations);
        let refined = self.morphology.erode(&dilated, self.params.erode_iterations);
        Ok(SkinMask::from_gray(refined))
    }

    /// Tightened face window, clipped to the frame.
    fn sample_region(
        &self,
        frame: &Frame,
        face: &FaceRegion,
    ) -> Result<FaceRegion, RecognitionError> {
        let degenerate = RecognitionError::DegenerateFaceRegion {
            width: face.width,
            height: face.height,
        };
        if face.is_degenerate() {
            return Err(degenerate);
        }
        face.tightened(self.params.tighten)
            .ok_or(degenerate)?
            .clip_to(frame.width(), frame.height())
            .ok_or(RecognitionError::FaceRegionOutsideFrame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::BACKGROUND;

    const SKIN_RGB: [u8; 3] = [224, 172, 140];
    const BACKDROP_RGB: [u8; 3] = [30, 60, 120];

    fn frame_with_patches(width: u32, height: u32, patches: &[(u32, u32, u32, u32)]) -> Frame {
        let mut data = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let inside = patches
                    .iter()
                    .any(|&(px, py, pw, ph)| x >= px && x < px + pw && y >= py && y < py + ph);
                data.extend_from_slice(if inside { &SKIN_RGB } else { &BACKDROP_RGB });
            }
        }
        Frame::new(data, width, height, 0)
    }

    fn builder() -> SkinMaskBuilder {
        SkinMaskBuilder::new(SkinMaskParams::default())
    }

    #[test]
    fn test_mask_matches_frame_dimensions_and_is_binary() {
        let frame = frame_with_patches(160, 120, &[(60, 10, 60, 60)]);
        let mask = builder()
            .build(&frame, &FaceRegion::new(70, 20, 40, 40))
            .unwrap();
        assert_eq!((mask.width(), mask.height()), (160, 120));
        assert!(mask
            .as_image()
            .pixels()
            .all(|p| p.0[0] == SKIN || p.0[0] == BACKGROUND));
    }

    #[test]
    fn test_detects_skin_colored_patch_away_from_face() {
        let frame = frame_with_patches(200, 150, &[(100, 10, 70, 70), (10, 80, 50, 50)]);
        let mask = builder()
            .build(&frame, &FaceRegion::new(110, 20, 50, 50))
            .unwrap();
        assert!(mask.is_skin(35, 105));
        assert!(!mask.is_skin(80, 60));
        assert!(!mask.is_skin(5, 5));
    }

    #[test]
    fn test_building_twice_is_idempotent() {
        let frame = frame_with_patches(160, 120, &[(60, 10, 60, 60), (5, 60, 40, 40)]);
        let face = FaceRegion::new(70, 20, 40, 40);
        let first = builder().build(&frame, &face).unwrap();
        let second = builder().build(&frame, &face).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_frame_is_not_modified() {
        let frame = frame_with_patches(80, 60, &[(20, 10, 30, 30)]);
        let original = frame.clone();
        builder()
            .build(&frame, &FaceRegion::new(25, 15, 20, 20))
            .unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_degenerate_face_is_rejected() {
        let frame = frame_with_patches(40, 40, &[]);
        let err = builder()
            .build(&frame, &FaceRegion::new(5, 5, 0, 10))
            .unwrap_err();
        assert_eq!(
            err,
            RecognitionError::DegenerateFaceRegion {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn test_face_outside_frame_is_rejected() {
        let frame = frame_with_patches(40, 40, &[]);
        let err = builder()
            .build(&frame, &FaceRegion::new(100, 100, 20, 20))
            .unwrap_err();
        assert_eq!(err, RecognitionError::FaceRegionOutsideFrame);
    }
}
