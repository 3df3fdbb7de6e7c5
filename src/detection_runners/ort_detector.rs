mod ort_engine;
mod ort_inference;
pub mod image_ops;
pub mod input_wrapper;
pub mod nms;
pub mod y;

pub use ort_engine::*;
pub use ort_inference::*;
