pub mod constants;
pub mod error;
pub mod face_region;
pub mod frame;
pub mod recognition_config;
pub mod sequence_metadata;
