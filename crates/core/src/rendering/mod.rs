pub mod hand_annotator;
