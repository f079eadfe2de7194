//! Core type definitions for sources, renditions, profiles and job results.
//!
//! Enums are serialized in lowercase so they can appear verbatim in TOML
//! configuration and on the command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Source metadata
// ---------------------------------------------------------------------------

/// Technical metadata about a source video, as reported by the prober.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Coded width in pixels (before rotation is applied).
    pub width: u32,
    /// Coded height in pixels (before rotation is applied).
    pub height: u32,
    /// Average frame rate, e.g. 29.97.
    pub fps: f64,
    /// Whether the source carries at least one audio stream.
    pub has_audio: bool,
    /// Clockwise rotation in degrees, normalized into `[0, 360)`.
    pub rotation: u32,
    /// Container duration in seconds, when the prober reported one.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl VideoInfo {
    /// Whether the rotation metadata turns the picture on its side.
    pub fn is_sideways(&self) -> bool {
        self.rotation % 180 == 90
    }

    /// Width as the viewer sees it, after rotation metadata is applied.
    pub fn display_width(&self) -> u32 {
        if self.is_sideways() {
            self.height
        } else {
            self.width
        }
    }

    /// Height as the viewer sees it, after rotation metadata is applied.
    pub fn display_height(&self) -> u32 {
        if self.is_sideways() {
            self.width
        } else {
            self.height
        }
    }

    /// Portrait in display orientation.
    pub fn is_portrait(&self) -> bool {
        self.display_height() > self.display_width()
    }
}

/// Normalize an arbitrary rotation in degrees into `[0, 360)` using floored
/// modulo, so `-90` becomes `270`.
pub fn normalize_rotation(degrees: i64) -> u32 {
    degrees.rem_euclid(360) as u32
}

// ---------------------------------------------------------------------------
// Renditions
// ---------------------------------------------------------------------------

/// One resolution/bitrate quality level of an adaptive-bitrate ladder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rendition {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Peak bitrate in kbps.
    pub max_rate: u32,
    /// VBV buffer size in kbps.
    pub buf_size: u32,
    /// H.264 profile (e.g. "main", "baseline").
    pub profile: String,
    /// H.264 level (e.g. "4.0", "3.1").
    pub level: String,
    /// Number of B-frames between reference frames.
    #[serde(default)]
    pub b_frames: u32,
}

impl Rendition {
    /// Create a rendition with no B-frames.
    pub fn new(
        width: u32,
        height: u32,
        max_rate: u32,
        buf_size: u32,
        profile: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            max_rate,
            buf_size,
            profile: profile.into(),
            level: level.into(),
            b_frames: 0,
        }
    }

    /// The same rendition with width and height exchanged.
    pub fn transposed(mut self) -> Self {
        std::mem::swap(&mut self.width, &mut self.height);
        self
    }
}

impl fmt::Display for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {}k (buf {}k, {} {})",
            self.width, self.height, self.max_rate, self.buf_size, self.profile, self.level
        )
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Which packaging profile a job asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// On-demand content, long segments.
    #[default]
    Vod,
    /// Live content, short segments and low-latency features.
    Live,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vod => write!(f, "vod"),
            Self::Live => write!(f, "live"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vod" => Ok(Self::Vod),
            "live" => Ok(Self::Live),
            other => Err(format!("Unknown profile: {}", other)),
        }
    }
}

/// Segmenting parameters for a packaging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Media segment duration in seconds.
    pub segment_duration: u32,
    /// Enable low-latency muxer features.
    pub low_latency: bool,
}

impl Profile {
    /// On-demand: 5 second segments.
    pub const VOD: Profile = Profile {
        segment_duration: 5,
        low_latency: false,
    };

    /// Live: 2 second segments, low latency.
    pub const LIVE: Profile = Profile {
        segment_duration: 2,
        low_latency: true,
    };

    /// Resolve the canonical profile for a selector.
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Vod => Self::VOD,
            ProfileKind::Live => Self::LIVE,
        }
    }
}

// ---------------------------------------------------------------------------
// Encoder options
// ---------------------------------------------------------------------------

/// Hardware acceleration backend used for the H.264 video encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuBackend {
    /// Software encoding (libx264).
    #[default]
    None,
    /// NVIDIA NVENC.
    Nvenc,
    /// VA-API (Intel/AMD on Linux).
    Vaapi,
    /// Apple VideoToolbox.
    VideoToolbox,
}

impl GpuBackend {
    /// ffmpeg encoder name for H.264 on this backend.
    pub fn h264_encoder(&self) -> &'static str {
        match self {
            Self::None => "libx264",
            Self::Nvenc => "h264_nvenc",
            Self::Vaapi => "h264_vaapi",
            Self::VideoToolbox => "h264_videotoolbox",
        }
    }
}

impl fmt::Display for GpuBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Nvenc => write!(f, "nvenc"),
            Self::Vaapi => write!(f, "vaapi"),
            Self::VideoToolbox => write!(f, "videotoolbox"),
        }
    }
}

impl FromStr for GpuBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" | "cpu" | "software" => Ok(Self::None),
            "nvenc" | "cuda" => Ok(Self::Nvenc),
            "vaapi" => Ok(Self::Vaapi),
            "videotoolbox" => Ok(Self::VideoToolbox),
            other => Err(format!("Unknown GPU backend: {}", other)),
        }
    }
}

/// Knobs passed through to the encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Encoder thread count; 0 lets ffmpeg decide.
    pub threads: u32,
    /// Hardware acceleration backend.
    pub gpu: GpuBackend,
    /// ffmpeg `-loglevel` value.
    pub log_level: String,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            gpu: GpuBackend::None,
            log_level: "warning".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution results
// ---------------------------------------------------------------------------

/// Resource usage of a finished subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// User CPU time in seconds.
    pub user_time: f64,
    /// System CPU time in seconds.
    pub system_time: f64,
    /// Peak resident set size in bytes.
    pub max_memory: u64,
}

/// One progress frame reported by the encoder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Encoded position, as reported (`HH:MM:SS.micros`).
    pub current_time: String,
    /// Current output bitrate, as reported (e.g. `"2500.1kbits/s"`).
    pub bitrate: String,
    /// Encoding speed relative to realtime, as reported (e.g. `"1.5x"`).
    pub speed: String,
    /// Completion in percent, `0.0..=100.0`.
    pub percentage: f64,
}
