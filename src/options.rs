//! Packaging options and their validating builder.

use mosaic_common::{EncoderOptions, GpuBackend};
use mosaic_ladder::LowResolutionPolicy;
use std::time::Duration;

/// Upper bound on the encoder thread count.
pub const MAX_THREADS: u32 = 256;

/// Values accepted by ffmpeg's `-loglevel`.
pub const LOG_LEVELS: [&str; 9] = [
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Invalid option values rejected by [`PackageOptionsBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("threads must be at most {max}, got {threads}")]
    TooManyThreads { threads: u32, max: u32 },

    #[error("unknown ffmpeg log level: {0}")]
    UnknownLogLevel(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validated settings for a [`Packager`](crate::pipeline::Packager).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PackageOptions {
    /// Knobs passed to the final ffmpeg invocation.
    pub encoder: EncoderOptions,
    /// De-rotate the source into a private workspace before encoding.
    pub normalize_orientation: bool,
    /// Ladder policy for sources below 360p.
    pub low_resolution: LowResolutionPolicy,
    /// Upper bound on the whole job, on top of the caller's context.
    pub timeout: Option<Duration>,
}

impl PackageOptions {
    /// Start from defaults: automatic threads, software encoding, `warning`
    /// log level, no orientation pass, forced baseline, no timeout.
    pub fn builder() -> PackageOptionsBuilder {
        PackageOptionsBuilder::default()
    }
}

/// Builder for [`PackageOptions`]; validation happens once in [`build`](Self::build).
///
/// # Example
///
/// ```
/// use mosaic::{GpuBackend, PackageOptions};
///
/// let options = PackageOptions::builder()
///     .threads(4)
///     .gpu(GpuBackend::Nvenc)
///     .log_level("info")
///     .build()
///     .unwrap();
/// assert_eq!(options.encoder.threads, 4);
///
/// assert!(PackageOptions::builder().threads(1000).build().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageOptionsBuilder {
    options: PackageOptions,
}

impl PackageOptionsBuilder {
    pub fn threads(mut self, threads: u32) -> Self {
        self.options.encoder.threads = threads;
        self
    }

    pub fn gpu(mut self, gpu: GpuBackend) -> Self {
        self.options.encoder.gpu = gpu;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.options.encoder.log_level = level.into();
        self
    }

    pub fn normalize_orientation(mut self, enabled: bool) -> Self {
        self.options.normalize_orientation = enabled;
        self
    }

    pub fn low_resolution(mut self, policy: LowResolutionPolicy) -> Self {
        self.options.low_resolution = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Validate and return the options.
    pub fn build(self) -> Result<PackageOptions, OptionsError> {
        let mut options = self.options;
        options.encoder.log_level = options.encoder.log_level.trim().to_lowercase();

        if options.encoder.threads > MAX_THREADS {
            return Err(OptionsError::TooManyThreads {
                threads: options.encoder.threads,
                max: MAX_THREADS,
            });
        }

        if !LOG_LEVELS.contains(&options.encoder.log_level.as_str()) {
            return Err(OptionsError::UnknownLogLevel(options.encoder.log_level.clone()));
        }

        if options.timeout == Some(Duration::ZERO) {
            return Err(OptionsError::ZeroTimeout);
        }

        Ok(options)
    }
}
