//! Source metadata probing via ffprobe.
//!
//! Two invocations per input: one for the first video stream (dimensions,
//! frame rate, rotation, container duration) and a best-effort one for the
//! presence of an audio stream.

mod ffprobe;

pub(crate) use ffprobe::{FfprobeOutput, FfprobeStream};

use crate::command::args;
use crate::{CommandExecutor, Error, ExecContext, Result};
use mosaic_common::VideoInfo;

/// Frame rate used when ffprobe reports something unusable.
pub const FALLBACK_FPS: f64 = 30.0;

const VIDEO_ENTRIES: &str =
    "stream=width,height,avg_frame_rate:stream_tags=rotate:stream_side_data=rotation:format=duration";

/// Probe `input` (a path or URL) for the metadata the ladder and encoders need.
///
/// # Errors
///
/// - [`Error::Probe`] if ffprobe fails, its JSON is invalid, or there is no
///   video stream
/// - [`Error::Cancelled`] if `ctx` is cancelled, unchanged
pub async fn probe(ctx: &ExecContext, exec: &dyn CommandExecutor, input: &str) -> Result<VideoInfo> {
    tracing::debug!("Probing {}", input);

    let (stream, output) = probe_first_video_stream(ctx, exec, input, VIDEO_ENTRIES).await?;

    let mut info = VideoInfo {
        width: stream.width,
        height: stream.height,
        fps: parse_fps(stream.avg_frame_rate.as_deref().unwrap_or("")),
        has_audio: false,
        rotation: stream.rotation(),
        duration: output.format.as_ref().and_then(|f| f.duration_secs()),
    };

    info.has_audio = probe_has_audio(ctx, exec, input).await?;

    tracing::debug!(
        "Probed {}: {}x{} @ {:.3} fps, rotation {}, audio {}",
        input,
        info.width,
        info.height,
        info.fps,
        info.rotation,
        info.has_audio
    );

    Ok(info)
}

/// Run ffprobe on the first video stream with `entries` and return it along
/// with the full output.
pub(crate) async fn probe_first_video_stream(
    ctx: &ExecContext,
    exec: &dyn CommandExecutor,
    input: &str,
    entries: &str,
) -> Result<(FfprobeStream, FfprobeOutput)> {
    let probe_args = args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        entries,
        "-of",
        "json",
        input,
    ]);

    let out = exec
        .execute(ctx, "ffprobe", &probe_args)
        .await
        .map_err(|e| Error::probe_caused(input, "ffprobe video request failed", e))?;

    let mut parsed: FfprobeOutput = serde_json::from_slice(&out.stdout)
        .map_err(|e| Error::probe_caused(input, "invalid ffprobe JSON", Error::Json(e)))?;

    if parsed.streams.is_empty() {
        return Err(Error::probe(input, "no video stream found"));
    }
    let stream = parsed.streams.remove(0);

    Ok((stream, parsed))
}

/// Whether `input` has an audio stream. Probe failures count as "no audio",
/// except cancellation.
async fn probe_has_audio(ctx: &ExecContext, exec: &dyn CommandExecutor, input: &str) -> Result<bool> {
    let audio_args = args([
        "-v",
        "error",
        "-select_streams",
        "a:0",
        "-show_entries",
        "stream=index",
        "-of",
        "csv=p=0",
        input,
    ]);

    match exec.execute(ctx, "ffprobe", &audio_args).await {
        Ok(out) => Ok(!out.stdout_lossy().trim().is_empty()),
        Err(e) if e.is_cancelled() => Err(e),
        Err(e) => {
            tracing::debug!("Audio probe failed for {}, assuming no audio: {}", input, e);
            Ok(false)
        }
    }
}

/// Parse an ffprobe rational frame rate such as `"30000/1001"`.
///
/// Anything other than exactly `num/den` with both parts numeric and a
/// non-zero denominator yields [`FALLBACK_FPS`].
pub fn parse_fps(rate: &str) -> f64 {
    let mut parts = rate.split('/');
    let (Some(num), Some(den), None) = (parts.next(), parts.next(), parts.next()) else {
        return FALLBACK_FPS;
    };

    match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
        (Ok(n), Ok(d)) if d != 0.0 && (n / d).is_finite() => n / d,
        _ => FALLBACK_FPS,
    }
}
