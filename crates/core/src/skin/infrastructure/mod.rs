pub mod gaussian;
pub mod morphology;
pub mod ycrcb;
