//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Tools the packaging pipeline shells out to.
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the version banner, if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// ffmpeg-family tools take `-version`; anything else gets `--version`.
///
/// # Example
///
/// ```no_run
/// use mosaic_av::check_tool;
///
/// let info = check_tool("ffprobe");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_at(name, Path::new(name), version_arg(name))
}

fn version_arg(name: &str) -> &'static str {
    if name.starts_with("ff") {
        "-version"
    } else {
        "--version"
    }
}

/// Check a tool at an explicit location (configured path or PATH name).
pub fn check_tool_at(name: &str, program: &Path, version_arg: &str) -> ToolInfo {
    match Command::new(program).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => unavailable(name),
    }
}

fn unavailable(name: &str) -> ToolInfo {
    ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    }
}

/// Check ffmpeg and ffprobe, resolving each through [`get_tool_path`] with
/// the location `configured` returns for it.
pub fn check_tools<'a>(configured: impl Fn(&str) -> Option<&'a Path>) -> Vec<ToolInfo> {
    REQUIRED_TOOLS
        .iter()
        .map(|name| match get_tool_path(name, configured(name)) {
            Ok(path) => check_tool_at(name, &path, version_arg(name)),
            Err(_) => unavailable(name),
        })
        .collect()
}

/// Require that a tool is on PATH, returning its path.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured {} path {} does not exist, falling back to PATH",
            name,
            path.display()
        );
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_tool_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_require_tool_not_found() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = get_tool_path("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_missing_configured_path_falls_back() {
        let result = get_tool_path(
            "nonexistent_tool_12345",
            Some(Path::new("/nonexistent/dir/tool")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_check_tools_reports_every_required_tool() {
        let missing = Path::new("/nonexistent/dir/tool");
        let infos = check_tools(|_| Some(missing));
        let names: Vec<&str> = infos.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, REQUIRED_TOOLS);
        // a dead configured path never reports that path back
        assert!(infos.iter().all(|t| t.path.as_deref() != Some(missing)));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_tools_uses_configured_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffprobe");
        std::fs::write(&script, "#!/bin/sh\necho 'ffprobe version 9.9-fake'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let infos = check_tools(|name| (name == "ffprobe").then_some(script.as_path()));
        let ffprobe = infos.iter().find(|t| t.name == "ffprobe").unwrap();
        assert!(ffprobe.available);
        assert_eq!(ffprobe.version.as_deref(), Some("ffprobe version 9.9-fake"));
        assert_eq!(ffprobe.path.as_deref(), Some(script.as_path()));
    }
}
