//! ONNX Runtime session wrapper.

use std::time::Instant;
use anyhow::Result;
use ort::{
    CUDAExecutionProvider, ExecutionProvider,
    GraphOptimizationLevel, SessionBuilder,
    Session, SessionOutputs,
    Tensor,
};
use crate::common::InferenceDevice;
use crate::data::{ConfigOrt, TimeCalc, X};

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    input_name: String,
    output_name: String,
    profile: bool,
    pub infer_time: TimeCalc,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {}
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => anyhow::bail!("Model {} declares no inputs", config.onnx_path.display()),
        };
        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => anyhow::bail!("Model {} declares no outputs", config.onnx_path.display()),
        };

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} | Output: {}",
            device,
            input_name,
            output_name,
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            profile: config.profile,
            infer_time: TimeCalc::default(),
        })
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if !ep.is_available()? {
            anyhow::bail!("CUDA execution provider is not available");
        }
        ep.register(builder)?;
        log::info!("CUDA device {} successfully registered", device_id);
        Ok(())
    }

    /// Runs the model on one input tensor and returns its first output.
    pub fn run(&mut self, x: X) -> Result<X> {
        let t = Instant::now();

        let input = Tensor::from_array(x.into_inner())?;
        let outputs: SessionOutputs =
            self.session.run(ort::inputs![self.input_name.as_str() => input.into_dyn()]?)?;
        let output = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()?
            .into_owned();

        self.infer_time.push(t.elapsed());
        if self.profile {
            log::info!("> Inference: {:?} | Avg: {:?}", t.elapsed(), self.infer_time.avg());
        }

        Ok(X::from(output))
    }

    /// Reads a custom metadata entry, e.g. the `names` map exported with YOLO models.
    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }
}
