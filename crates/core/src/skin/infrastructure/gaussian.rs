use crate::shared::frame::{Frame, CHANNELS};

/// Precompute a normalized 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let half = (kernel_size / 2) as f64;
    let mut kernel_f64: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

/// Mirror an out-of-range coordinate back into `0..len` without repeating
/// the edge sample (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(pos: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut p = pos;
    while p < 0 || p > last {
        p = if p < 0 { -p } else { 2 * last - p };
    }
    p as usize
}

/// Separable Gaussian blur of interleaved pixel data, in place.
pub fn separable_gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = (kernel_size / 2) as isize;
    let mut temp = vec![0.0f32; width * height * channels];

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as isize + k as isize - half, width);
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as isize + k as isize - half, height);
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Returns a smoothed copy of `frame`; the input is left untouched.
pub fn blurred_frame(frame: &Frame, kernel_size: usize, sigma: f64) -> Frame {
    let mut smoothed = frame.clone();
    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    separable_gaussian_blur(smoothed.data_mut(), w, h, CHANNELS, &kernel);
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_kernel_sums_to_one() {
        let k = gaussian_kernel_1d(9, 1.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kernel_is_symmetric_and_peaked() {
        let k = gaussian_kernel_1d(9, 1.0);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
            assert!(k[i] < k[4]);
        }
    }

    #[test]
    fn test_sigma_controls_spread() {
        let narrow = gaussian_kernel_1d(9, 1.0);
        let wide = gaussian_kernel_1d(9, 3.0);
        assert!(narrow[4] > wide[4]);
    }

    #[rstest]
    #[case(-1, 5, 1)]
    #[case(-2, 5, 2)]
    #[case(5, 5, 3)]
    #[case(6, 5, 2)]
    #[case(3, 5, 3)]
    #[case(-3, 1, 0)]
    fn test_reflect_101(#[case] pos: isize, #[case] len: usize, #[case] expected: usize) {
        assert_eq!(reflect_101(pos, len), expected);
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let mut data = vec![173u8; 12 * 10 * 3];
        let kernel = gaussian_kernel_1d(9, 1.0);
        separable_gaussian_blur(&mut data, 12, 10, 3, &kernel);
        assert!(data.iter().all(|&v| v == 173));
    }

    #[test]
    fn test_blur_spreads_bright_pixel() {
        let mut data = vec![0u8; 10 * 10 * 3];
        let cx = 5 * 10 + 5;
        data[cx * 3] = 255;
        let kernel = gaussian_kernel_1d(9, 1.0);
        separable_gaussian_blur(&mut data, 10, 10, 3, &kernel);
        assert!(data[cx * 3] < 255);
        assert!(data[(5 * 10 + 6) * 3] > 0);
        // other channels stay dark
        assert_eq!(data[cx * 3 + 1], 0);
    }

    #[test]
    fn test_blurred_frame_leaves_input_untouched() {
        let mut data = vec![0u8; 8 * 8 * 3];
        data[(4 * 8 + 4) * 3] = 255;
        let frame = Frame::new(data, 8, 8, 0);
        let original = frame.clone();
        let smoothed = blurred_frame(&frame, 9, 1.0);
        assert_eq!(frame, original);
        assert_ne!(smoothed, original);
    }
}
