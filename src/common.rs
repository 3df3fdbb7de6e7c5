mod app_config;
mod bottle_box;
mod bottle_detection;
mod inference_device;
mod model_config;
mod sample_image;

pub use app_config::*;
pub use bottle_box::*;
pub use bottle_detection::*;
pub use inference_device::*;
pub use model_config::*;
pub use sample_image::*;
