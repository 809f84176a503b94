pub const SEETA_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const SEETA_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Face size bounds of the frontal locator, in pixels.
pub const MIN_FACE_SIZE: u32 = 60;
pub const MAX_FACE_SIZE: u32 = 300;

/// Mask value for skin pixels.
pub const SKIN: u8 = 255;
/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Fewest polygon vertices an ellipse can be fitted to.
pub const MIN_POLYGON_VERTICES: usize = 5;
/// Fewest hull vertices for which convexity defects are defined.
pub const MIN_HULL_VERTICES: usize = 4;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
