mod config_ort;
mod time_calc;

pub use config_ort::ConfigOrt;
pub use time_calc::TimeCalc;

pub use crate::detection_runners::ort_detector::image_ops::ImageTransformInfo;
pub use crate::detection_runners::ort_detector::input_wrapper::X;
pub use crate::detection_runners::ort_detector::y::Y;
