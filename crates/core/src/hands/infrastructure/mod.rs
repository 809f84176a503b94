pub mod contours;
pub mod shape_geometry;
