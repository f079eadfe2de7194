//! ffmpeg argument builders for CMAF packaging.
//!
//! An [`ArgumentBuilder`] turns an [`EncodePlan`] (what the pipeline decided)
//! into the ffmpeg command line for one container format. Builders are pure;
//! running the command is the packager's job.

mod dash;
mod hls;
pub mod progress;

pub use dash::DashCmaf;
pub use hls::HlsCmaf;
pub use progress::{parse_progress, progress_info};

use mosaic_av::args;
use mosaic_common::{EncoderOptions, Profile, Rendition, VideoInfo};
use mosaic_ladder::calc_gop;
use std::path::PathBuf;

/// Everything needed to build a packaging command line.
#[derive(Debug, Clone)]
pub struct EncodePlan {
    /// Source path or URL handed to ffmpeg.
    pub input: String,
    /// Directory receiving manifests and segments.
    pub output_dir: PathBuf,
    /// Source metadata.
    pub info: VideoInfo,
    /// Segmenting profile.
    pub profile: Profile,
    /// Optimized renditions, highest first.
    pub renditions: Vec<Rendition>,
    /// Encoder knobs.
    pub options: EncoderOptions,
    /// Emit machine-readable progress on stdout.
    pub progress: bool,
}

impl EncodePlan {
    /// Keyframe interval aligned to the profile's segment duration.
    pub fn gop(&self) -> u32 {
        calc_gop(self.info.fps, self.profile.segment_duration)
    }

    fn output_path(&self, name: &str) -> String {
        self.output_dir.join(name).to_string_lossy().into_owned()
    }
}

/// Builds the ffmpeg arguments for one packaging format.
pub trait ArgumentBuilder: Send + Sync {
    /// Short format name used in logs and errors (e.g. `"hls"`).
    fn name(&self) -> &'static str;

    /// The full ffmpeg argument list, excluding the program name.
    fn build_args(&self, plan: &EncodePlan) -> Vec<String>;
}

/// Global flags and the input, shared by every format.
fn input_args(plan: &EncodePlan) -> Vec<String> {
    let mut cmd = args(["-y", "-loglevel", plan.options.log_level.as_str()]);

    if plan.progress {
        cmd.extend(args(["-progress", "pipe:1", "-nostats"]));
    }

    cmd.extend(args([
        "-analyzeduration",
        "100M",
        "-probesize",
        "100M",
        "-fflags",
        "+genpts",
        "-i",
        plan.input.as_str(),
    ]));

    if plan.options.threads > 0 {
        cmd.extend(args(["-threads".to_string(), plan.options.threads.to_string()]));
    }

    cmd
}

/// Per-rendition H.264 rate control and GOP flags for output stream `index`.
fn video_stream_args(plan: &EncodePlan, index: usize, r: &Rendition) -> Vec<String> {
    let gop = plan.gop().to_string();
    vec![
        format!("-c:v:{}", index),
        plan.options.gpu.h264_encoder().to_string(),
        format!("-profile:v:{}", index),
        r.profile.clone(),
        format!("-level:v:{}", index),
        r.level.clone(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-preset".into(),
        "medium".into(),
        "-g".into(),
        gop.clone(),
        "-keyint_min".into(),
        gop,
        "-sc_threshold".into(),
        "0".into(),
        format!("-maxrate:v:{}", index),
        format!("{}k", r.max_rate),
        format!("-bufsize:v:{}", index),
        format!("{}k", r.buf_size),
    ]
}

/// AAC stereo audio for output stream `index`, mapped from `source`.
fn audio_stream_args(index: usize, source: &str) -> Vec<String> {
    vec![
        "-map".into(),
        source.into(),
        format!("-c:a:{}", index),
        "aac".into(),
        format!("-b:a:{}", index),
        "96k".into(),
        "-ac".into(),
        "2".into(),
    ]
}
