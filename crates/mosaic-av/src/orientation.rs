//! Orientation normalization.
//!
//! Sources carrying rotation metadata (phones, mostly) are physically rotated
//! so every downstream player shows them upright, and the metadata is cleared.
//! Unrotated sources are only remuxed with the metadata cleared.
//!
//! The result is written to a hidden temp file next to the output and renamed
//! over it once complete (and, for re-encodes, verified).

use crate::command::args;
use crate::error::OrientationPhase;
use crate::probe::probe_first_video_stream;
use crate::{CommandExecutor, Error, ExecContext, Result};
use std::path::Path;
use tempfile::TempPath;

/// Encoder used when the source codec has no preferred match, and as the
/// fallback when the preferred encoder fails.
pub const DEFAULT_ENCODER: &str = "libx264";

const ORIENTATION_ENTRIES: &str =
    "stream=width,height,codec_name:stream_tags=rotate:stream_side_data=rotation";

/// What normalization did to produce the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Streams copied, rotation metadata cleared.
    Remuxed,
    /// Frames rotated and re-encoded with `encoder`.
    Rotated { rotation: u32, encoder: String },
}

/// Rewrite `input` into `output` with upright frames and no rotation metadata.
///
/// The output directory is created if needed. On any failure `output` is
/// left untouched and the temp file is removed.
///
/// # Errors
///
/// - [`Error::Config`] for empty paths
/// - [`Error::Orientation`] naming the failed phase
/// - [`Error::Cancelled`] if `ctx` is cancelled, unchanged
pub async fn normalize_orientation(
    ctx: &ExecContext,
    exec: &dyn CommandExecutor,
    input: &str,
    output: &Path,
) -> Result<NormalizeOutcome> {
    if input.trim().is_empty() {
        return Err(Error::config("input path is required"));
    }
    if output.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(Error::config("output path is required"));
    }

    let (stream, _) = probe_first_video_stream(ctx, exec, input, ORIENTATION_ENTRIES)
        .await
        .map_err(|e| Error::orientation(OrientationPhase::Probe, e))?;
    let rotation = stream.rotation();

    let temp = prepare_temp_output(output)
        .map_err(|e| Error::orientation(OrientationPhase::Finalize, e))?;
    let temp_str = temp.to_string_lossy().into_owned();

    let outcome = match rotation_filter(rotation) {
        None => {
            tracing::info!("Remuxing {} to clear rotation metadata", input);
            exec.execute(ctx, "ffmpeg", &remux_args(input, &temp_str))
                .await
                .map_err(|e| Error::orientation(OrientationPhase::Encode, e))?;
            NormalizeOutcome::Remuxed
        }
        Some(filter) => {
            let preferred = preferred_encoder(stream.codec_name.as_deref().unwrap_or(""));
            tracing::info!(
                "Rotating {} by {} degrees with {}",
                input,
                rotation,
                preferred
            );

            let encoder = match exec
                .execute(ctx, "ffmpeg", &rotate_args(input, &temp_str, &preferred, filter))
                .await
            {
                Ok(_) => preferred,
                Err(e) if e.is_cancelled() || preferred == DEFAULT_ENCODER => {
                    return Err(Error::orientation(OrientationPhase::Encode, e));
                }
                Err(e) => {
                    tracing::warn!(
                        "Encoder {} failed, retrying with {}: {}",
                        preferred,
                        DEFAULT_ENCODER,
                        e
                    );
                    exec.execute(
                        ctx,
                        "ffmpeg",
                        &rotate_args(input, &temp_str, DEFAULT_ENCODER, filter),
                    )
                    .await
                    .map_err(|e| Error::orientation(OrientationPhase::Encode, e))?;
                    DEFAULT_ENCODER.to_string()
                }
            };

            let (verified, _) = probe_first_video_stream(ctx, exec, &temp_str, ORIENTATION_ENTRIES)
                .await
                .map_err(|e| Error::orientation(OrientationPhase::Verify, e))?;
            let remaining = verified.rotation();
            if remaining != 0 {
                return Err(Error::orientation(
                    OrientationPhase::Verify,
                    Error::Verification {
                        rotation: remaining,
                    },
                ));
            }

            NormalizeOutcome::Rotated { rotation, encoder }
        }
    };

    temp.persist(output)
        .map_err(|e| Error::orientation(OrientationPhase::Finalize, Error::Io(e.error)))?;

    tracing::debug!("Normalized orientation written to {}", output.display());
    Ok(outcome)
}

/// Create the output directory and reserve a hidden temp path inside it.
///
/// The returned path deletes its file on drop unless persisted.
fn prepare_temp_output(output: &Path) -> Result<TempPath> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(".mosaic-orientation-")
        .suffix(&suffix)
        .tempfile_in(&dir)?;

    Ok(file.into_temp_path())
}

/// Transpose filter that undoes `rotation`, or `None` when no rotation is needed.
pub fn rotation_filter(rotation: u32) -> Option<&'static str> {
    match rotation % 360 {
        90 => Some("transpose=1"),
        180 => Some("transpose=1,transpose=1"),
        270 => Some("transpose=2"),
        _ => None,
    }
}

/// Software encoder matching the source codec, so re-encoding keeps the format.
pub fn preferred_encoder(codec_name: &str) -> String {
    let codec = codec_name.trim().to_lowercase();
    match codec.as_str() {
        "h264" => "libx264".to_string(),
        "hevc" => "libx265".to_string(),
        "vp8" => "libvpx".to_string(),
        "vp9" => "libvpx-vp9".to_string(),
        "av1" => "libaom-av1".to_string(),
        "mpeg4" | "mjpeg" | "prores" | "dnxhd" => codec,
        _ => DEFAULT_ENCODER.to_string(),
    }
}

/// Stream-copy `input` to `output`, clearing rotation metadata.
pub fn remux_args(input: &str, output: &str) -> Vec<String> {
    args([
        "-y",
        "-v",
        "error",
        "-i",
        input,
        "-c",
        "copy",
        "-metadata:s:v:0",
        "rotate=0",
        output,
    ])
}

/// Re-encode the video of `input` through `filter`, copying audio.
pub fn rotate_args(input: &str, output: &str, encoder: &str, filter: &str) -> Vec<String> {
    args([
        "-y",
        "-v",
        "error",
        "-noautorotate",
        "-i",
        input,
        "-map",
        "0:v:0",
        "-map",
        "0:a?",
        "-vf",
        filter,
        "-c:v",
        encoder,
        "-c:a",
        "copy",
        "-metadata:s:v:0",
        "rotate=0",
        output,
    ])
}
