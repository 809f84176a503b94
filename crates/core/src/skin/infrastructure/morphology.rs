use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Elliptical structuring element inscribed in a `width` x `height` box,
/// anchored at `(width / 2, height / 2)`.
///
/// Row spans follow the classic raster construction: for each row the
/// half-span is `round(cx * sqrt(1 - dy² / r²))` with `r = height / 2`,
/// so the top row is a single pixel and the box's last row is omitted
/// when the height is even.
pub fn elliptical_element(width: u32, height: u32) -> GrayImage {
    let mut element = GrayImage::new(width, height);
    let r = (height / 2) as i64;
    let c = (width / 2) as i64;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    for row in 0..height as i64 {
        let dy = row - r;
        if dy.abs() > r {
            continue;
        }
        let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i64;
        let start = (c - dx).max(0);
        let end = (c + dx + 1).min(width as i64);
        for col in start..end {
            element.put_pixel(col as u32, row as u32, Luma([255]));
        }
    }
    element
}

/// Morphological closing-style refinement: dilate, then erode, each with
/// the same elliptical element.
pub struct EllipticalMorphology {
    mask: Mask,
}

impl EllipticalMorphology {
    /// `width` and `height` must be in `1..=255`.
    pub fn new(width: u32, height: u32) -> Self {
        let element = elliptical_element(width, height);
        let mask = Mask::from_image(&element, (width / 2) as u8, (height / 2) as u8);
        Self { mask }
    }

    pub fn dilate(&self, image: &GrayImage, iterations: usize) -> GrayImage {
        let mut out = image.clone();
        for _ in 0..iterations {
            out = grayscale_dilate(&out, &self.mask);
        }
        out
    }

    pub fn erode(&self, image: &GrayImage, iterations: usize) -> GrayImage {
        let mut out = image.clone();
        for _ in 0..iterations {
            out = grayscale_erode(&out, &self.mask);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_set(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn test_element_shape_10x20() {
        let e = elliptical_element(10, 20);
        assert_eq!(e.dimensions(), (10, 20));
        // top row is a single pixel at the anchor column
        let top: Vec<u32> = (0..10).filter(|&x| e.get_pixel(x, 0).0[0] > 0).collect();
        assert_eq!(top, vec![5]);
        // center row spans the full width
        assert!((0..10).all(|x| e.get_pixel(x, 10).0[0] > 0));
    }

    #[test]
    fn test_element_is_horizontally_centered() {
        let e = elliptical_element(11, 11);
        for y in 0..11 {
            for x in 0..5 {
                assert_eq!(e.get_pixel(x, y), e.get_pixel(10 - x, y));
            }
        }
    }

    #[test]
    fn test_dilate_grows_and_erode_shrinks() {
        let mut img = GrayImage::new(60, 60);
        for y in 25..35 {
            for x in 25..35 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let morph = EllipticalMorphology::new(10, 20);
        let dilated = morph.dilate(&img, 1);
        let eroded = morph.erode(&img, 1);
        assert!(count_set(&dilated) > count_set(&img));
        assert!(count_set(&eroded) < count_set(&img));
    }

    #[test]
    fn test_close_bridges_small_gap() {
        let mut img = GrayImage::new(80, 60);
        for y in 20..40 {
            for x in 10..35 {
                img.put_pixel(x, y, Luma([255]));
            }
            for x in 38..70 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let morph = EllipticalMorphology::new(10, 20);
        let closed = morph.erode(&morph.dilate(&img, 1), 1);
        assert_eq!(closed.get_pixel(36, 30).0[0], 255);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(4, 4, Luma([255]));
        let morph = EllipticalMorphology::new(3, 3);
        assert_eq!(morph.dilate(&img, 0), img);
    }
}
