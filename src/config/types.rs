use mosaic_common::GpuBackend;
use mosaic_ladder::LowResolutionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub ladder: LadderConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EncoderConfig {
    /// Encoder threads (0 lets ffmpeg decide)
    #[serde(default)]
    pub threads: u32,

    /// Hardware encoder backend
    #[serde(default)]
    pub gpu: GpuBackend,

    /// ffmpeg `-loglevel`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// De-rotate sources before packaging
    #[serde(default)]
    pub normalize_orientation: bool,

    /// Whole-job timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            gpu: GpuBackend::None,
            log_level: default_log_level(),
            normalize_orientation: false,
            timeout_secs: None,
        }
    }
}

fn default_log_level() -> String {
    "warning".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LadderConfig {
    /// What to do with sources below 360p
    #[serde(default)]
    pub low_resolution: LowResolutionPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

impl ToolsConfig {
    /// Configured location of `name`, if any.
    pub fn path_for(&self, name: &str) -> Option<&Path> {
        match name {
            "ffmpeg" => self.ffmpeg_path.as_deref(),
            "ffprobe" => self.ffprobe_path.as_deref(),
            _ => None,
        }
    }
}
