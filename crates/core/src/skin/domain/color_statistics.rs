use ndarray::s;

use crate::shared::face_region::FaceRegion;
use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::recognition_config::{SigmaBounds, SkinMaskParams};

/// Per-channel mean and population standard deviation of a frame region.
///
/// Computed once per face per frame and never carried across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStatistics {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

/// Inclusive per-channel value range that classifies a pixel as skin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorStatistics {
    /// Statistics over `region`, which must lie inside the frame.
    pub fn compute(frame: &Frame, region: &FaceRegion) -> Self {
        let view = frame.as_ndarray();
        let (x0, y0) = (region.x as usize, region.y as usize);
        let (x1, y1) = (region.right() as usize, region.bottom() as usize);
        let window = view.slice(s![y0..y1, x0..x1, ..]);
        let count = (window.len() / CHANNELS).max(1) as f64;

        let mut mean = [0.0; 3];
        let mut std_dev = [0.0; 3];
        for c in 0..CHANNELS {
            let channel = window.slice(s![.., .., c]);
            let sum: f64 = channel.iter().map(|&v| v as f64).sum();
            let m = sum / count;
            let sq: f64 = channel.iter().map(|&v| (v as f64 - m).powi(2)).sum();
            mean[c] = m;
            std_dev[c] = (sq / count).sqrt();
        }
        Self { mean, std_dev }
    }

    /// Skin range around the channel means.
    ///
    /// Every channel is widened by multiples of the *luma* deviation. The
    /// chroma channels' own deviations are ignored. Switching to them
    /// alters which pixels count as skin.
    pub fn skin_range(&self, params: &SkinMaskParams) -> ChannelRange {
        let sigma = self.std_dev[0];
        let bounds: [SigmaBounds; 3] = [params.luma, params.chroma_red, params.chroma_blue];
        let mut lower = [0u8; 3];
        let mut upper = [0u8; 3];
        for c in 0..CHANNELS {
            lower[c] = saturate(self.mean[c] - bounds[c].lower * sigma);
            upper[c] = saturate(self.mean[c] + bounds[c].upper * sigma);
        }
        ChannelRange { lower, upper }
    }
}

impl ChannelRange {
    pub fn contains(&self, px: &[u8]) -> bool {
        (0..CHANNELS).all(|c| self.lower[c] <= px[c] && px[c] <= self.upper[c])
    }
}

fn saturate(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
