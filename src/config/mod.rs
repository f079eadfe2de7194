mod types;

pub use types::*;

use crate::options::{PackageOptions, LOG_LEVELS, MAX_THREADS};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mosaic.toml",
        "~/.config/mosaic/config.toml",
        "/etc/mosaic/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let encoder = &config.encoder;

    if encoder.threads > MAX_THREADS {
        anyhow::bail!(
            "encoder.threads must be at most {}, got {}",
            MAX_THREADS,
            encoder.threads
        );
    }

    if !LOG_LEVELS.contains(&encoder.log_level.trim().to_lowercase().as_str()) {
        anyhow::bail!("Unknown encoder.log_level '{}'", encoder.log_level);
    }

    if encoder.timeout_secs == Some(0) {
        anyhow::bail!("encoder.timeout_secs must be greater than zero");
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

impl Config {
    /// Packaging options described by this file.
    pub fn package_options(&self) -> Result<PackageOptions> {
        let mut builder = PackageOptions::builder()
            .threads(self.encoder.threads)
            .gpu(self.encoder.gpu)
            .log_level(self.encoder.log_level.clone())
            .normalize_orientation(self.encoder.normalize_orientation)
            .low_resolution(self.ladder.low_resolution);

        if let Some(secs) = self.encoder.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build().context("Invalid packaging options")
    }
}
