pub mod gesture_classifier;
pub mod hand;
pub mod hand_region_extractor;
pub mod shape_descriptors;
