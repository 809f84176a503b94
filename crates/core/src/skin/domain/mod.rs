pub mod color_statistics;
pub mod skin_mask;
pub mod skin_mask_builder;
