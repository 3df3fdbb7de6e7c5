use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
}

impl InferenceDevice {
    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => "CPU",
            InferenceDevice::CUDA(_) => "CUDA",
        }
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CPU => write!(f, "{}", self.str()),
            InferenceDevice::CUDA(id) => write!(f, "{}:{}", self.str(), id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_lowercase_names() {
        let device: InferenceDevice = serde_json::from_str(r#""cpu""#).unwrap();
        assert_eq!(device, InferenceDevice::CPU);
        let device: InferenceDevice = serde_json::from_str(r#"{"cuda": 1}"#).unwrap();
        assert_eq!(device, InferenceDevice::CUDA(1));
    }

    #[test]
    fn displays_device_id() {
        assert_eq!(InferenceDevice::CUDA(2).to_string(), "CUDA:2");
        assert_eq!(InferenceDevice::CPU.to_string(), "CPU");
    }
}
