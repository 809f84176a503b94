pub mod pipeline_logger;
pub mod recognize_gestures_use_case;
