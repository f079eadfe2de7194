//! Mosaic - adaptive-bitrate HLS/DASH packaging on top of ffmpeg
//!
//! The library probes a source, optionally de-rotates it, plans an
//! optimized rendition ladder and runs a single ffmpeg invocation that writes
//! CMAF segments plus the HLS or DASH manifests.
//!
//! Every entry point takes its [`CommandExecutor`] explicitly; use
//! [`ProcessExecutor`] for real runs and [`MockExecutor`] in tests.

pub mod config;
pub mod encoder;
pub mod job;
pub mod options;
pub mod pipeline;

pub use encoder::{ArgumentBuilder, DashCmaf, EncodePlan, HlsCmaf};
pub use job::{Job, ProgressHandler};
pub use options::{OptionsError, PackageOptions, PackageOptionsBuilder};
pub use pipeline::{PackageReport, Packager};

pub use mosaic_av::{
    CancelReason, CommandExecutor, CommandOutput, Error, ExecContext, MockExecutor, MockResponse,
    Result,
};
#[cfg(unix)]
pub use mosaic_av::ProcessExecutor;
pub use mosaic_common::{
    EncoderOptions, GpuBackend, Profile, ProfileKind, ProgressInfo, Rendition, Usage, VideoInfo,
};
pub use mosaic_ladder::LowResolutionPolicy;
