//! Palm gesture recognition from face-anchored skin statistics.
//!
//! Each frame flows through face location, an adaptive skin mask derived
//! from the face's color statistics, connected-region extraction and a
//! geometric gesture classifier. No state survives from one frame to the
//! next.

pub mod detection;
pub mod hands;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod skin;
pub mod video;
