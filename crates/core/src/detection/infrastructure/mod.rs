pub mod fixed_face_locator;
pub mod model_resolver;
pub mod rustface_locator;
