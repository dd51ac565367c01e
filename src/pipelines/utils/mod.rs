use std::fmt;
use std::str::FromStr;

use candle_core::Device;

use crate::core::error::Result;

/// Loads a device to be used for the model.
/// If `index` is `Some(i)` it will attempt to load the specified CUDA device.
/// When `None` it uses CUDA device 0 if available and otherwise falls back
/// to CPU.
pub fn load_device_with(index: Option<usize>) -> Result<Device> {
    match index {
        Some(i) => Ok(Device::new_cuda(i)?),
        None => Ok(Device::cuda_if_available(0)?),
    }
}

/// Request for a specific device, used by pipeline builders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceRequest {
    /// Always run on CPU. Linear artifacts never leave it regardless.
    #[default]
    Cpu,
    /// Use CUDA if available, otherwise CPU.
    Auto,
    /// Select a specific CUDA device by index.
    Cuda(usize),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(&self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Auto => load_device_with(None),
            DeviceRequest::Cuda(i) => load_device_with(Some(*i)),
        }
    }
}

impl fmt::Display for DeviceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRequest::Cpu => f.write_str("cpu"),
            DeviceRequest::Auto => f.write_str("auto"),
            DeviceRequest::Cuda(i) => write!(f, "cuda:{i}"),
        }
    }
}

impl FromStr for DeviceRequest {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "cpu" => Ok(DeviceRequest::Cpu),
            "auto" => Ok(DeviceRequest::Auto),
            "cuda" | "gpu" => Ok(DeviceRequest::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|i| i.parse().ok())
                .map(DeviceRequest::Cuda)
                .ok_or_else(|| {
                    format!("expected `cpu`, `auto`, `cuda` or `cuda:<index>`, got `{other}`")
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_requests() {
        assert_eq!("cpu".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cpu);
        assert_eq!("AUTO".parse::<DeviceRequest>().unwrap(), DeviceRequest::Auto);
        assert_eq!("cuda".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(0));
        assert_eq!("cuda:2".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(2));
        assert!("cuda:x".parse::<DeviceRequest>().is_err());
        assert!("tpu".parse::<DeviceRequest>().is_err());
    }

    #[test]
    fn cpu_always_resolves() {
        assert!(DeviceRequest::Cpu.resolve().unwrap().is_cpu());
        assert_eq!(DeviceRequest::Cuda(3).to_string(), "cuda:3");
    }
}
