use thiserror::Error;

/// Failures of the per-face recognition pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    #[error("face region must have positive dimensions, got {width}x{height}")]
    DegenerateFaceRegion { width: i32, height: i32 },
    #[error("face region does not overlap the frame")]
    FaceRegionOutsideFrame,
    #[error("insufficient shape data: {vertices} polygon vertices, {hull_vertices} hull vertices")]
    InsufficientShapeData { vertices: usize, hull_vertices: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
