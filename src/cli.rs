use clap::{Args, Parser, Subcommand};
use mosaic::{GpuBackend, ProfileKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(author, version, about = "Adaptive-bitrate HLS/DASH packager built on ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Package a source as HLS with CMAF segments
    Hls(PackageArgs),

    /// Package a source as DASH with CMAF segments
    Dash(PackageArgs),

    /// Probe a video and display its metadata
    Probe {
        /// File or URL to probe
        #[arg(required = true)]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the optimized rendition ladder for a source without encoding
    Ladder {
        /// File or URL to plan for
        #[arg(required = true)]
        input: String,
    },

    /// Physically rotate a source upright and clear its rotation metadata
    Normalize {
        /// Source file
        #[arg(required = true)]
        input: String,

        /// Destination file
        #[arg(required = true)]
        output: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Flags shared by the packaging commands. Unset flags fall back to the
/// config file.
#[derive(Args)]
pub struct PackageArgs {
    /// Source file or URL
    #[arg(required = true)]
    pub input: String,

    /// Directory for manifests and segments
    #[arg(required = true)]
    pub output_dir: PathBuf,

    /// Packaging profile (vod or live)
    #[arg(long, default_value = "vod")]
    pub profile: ProfileKind,

    /// Hardware encoder (none, nvenc, vaapi, videotoolbox)
    #[arg(long)]
    pub gpu: Option<GpuBackend>,

    /// Encoder threads (0 lets ffmpeg decide)
    #[arg(long)]
    pub threads: Option<u32>,

    /// ffmpeg log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// De-rotate the source before packaging
    #[arg(long)]
    pub normalize_orientation: bool,

    /// Abort the job after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
