use std::path::PathBuf;

/// Describes an opened frame source.
///
/// `width` and `height` are those of the first frame; later frames may
/// differ and are processed at their own size.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceMetadata {
    pub width: u32,
    pub height: u32,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}
