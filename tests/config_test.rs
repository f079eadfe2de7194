//! Config file loading.

use mosaic::config::{load_config, load_config_or_default};
use mosaic::{GpuBackend, LowResolutionPolicy};
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::fs::write(file.path(), contents).unwrap();
    file
}

#[test]
fn load_full_config() {
    let file = write_config(
        r#"
[encoder]
threads = 4
gpu = "vaapi"
log_level = "info"
normalize_orientation = true
timeout_secs = 120

[ladder]
low_resolution = "skip"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.encoder.gpu, GpuBackend::Vaapi);

    let options = config.package_options().unwrap();
    assert_eq!(options.encoder.threads, 4);
    assert_eq!(options.encoder.log_level, "info");
    assert!(options.normalize_orientation);
    assert_eq!(options.low_resolution, LowResolutionPolicy::Skip);
    assert_eq!(options.timeout, Some(Duration::from_secs(120)));
}

#[test]
fn explicit_path_is_used() {
    let file = write_config("[encoder]\nthreads = 2\n");
    let config = load_config_or_default(Some(file.path())).unwrap();
    assert_eq!(config.encoder.threads, 2);
    assert_eq!(config.encoder.log_level, "warning");
}

#[test]
fn invalid_values_rejected() {
    for contents in [
        "[encoder]\nthreads = 1000\n",
        "[encoder]\nlog_level = \"shouty\"\n",
        "[encoder]\ntimeout_secs = 0\n",
        "[ladder]\nlow_resolution = \"upscale_everything\"\n",
        "not toml at all [",
    ] {
        let file = write_config(contents);
        assert!(load_config(file.path()).is_err(), "accepted: {}", contents);
    }
}

#[test]
fn missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
