//! ffmpeg `-progress` output parsing.

use mosaic_common::ProgressInfo;
use std::collections::HashMap;

/// Split a raw progress chunk into `key=value` fields.
///
/// Each line is split on its first `=` and both sides are trimmed. Lines
/// without `=` are skipped; repeated keys keep the last value.
pub fn parse_progress(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Parse ffmpeg's `HH:MM:SS.micros` position into seconds.
pub fn parse_out_time(value: &str) -> Option<f64> {
    let value = value.trim();
    let (sign, value) = match value.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, value),
    };

    let mut parts = value.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let hours: f64 = h.parse().ok()?;
    let minutes: f64 = m.parse().ok()?;
    let seconds: f64 = s.parse().ok()?;
    Some(sign * (hours * 3600.0 + minutes * 60.0 + seconds))
}

/// Encoded position in seconds, preferring the microsecond counter.
fn position_secs(fields: &HashMap<String, String>) -> Option<f64> {
    fields
        .get("out_time_us")
        .and_then(|v| v.parse::<f64>().ok())
        .map(|us| us / 1_000_000.0)
        .or_else(|| fields.get("out_time").and_then(|v| parse_out_time(v)))
}

/// Map parsed progress fields onto a [`ProgressInfo`].
///
/// The percentage is 100 once ffmpeg reports `progress=end`; otherwise it is
/// derived from the position and `duration` (clamped to `0..=100`), or 0 when
/// either is unknown.
pub fn progress_info(fields: &HashMap<String, String>, duration: Option<f64>) -> ProgressInfo {
    let field = |key: &str| fields.get(key).cloned().unwrap_or_default();

    let percentage = if fields.get("progress").map(String::as_str) == Some("end") {
        100.0
    } else {
        match (position_secs(fields), duration) {
            (Some(pos), Some(total)) if total > 0.0 => (pos / total * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        }
    };

    ProgressInfo {
        current_time: field("out_time"),
        bitrate: field("bitrate"),
        speed: field("speed"),
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: &str = "frame=120\nfps=59.94\nbitrate=2500.1kbits/s\n\
                         out_time_us=4000000\nout_time=00:00:04.000000\n\
                         speed= 1.5x\nprogress=continue\n";

    #[test]
    fn test_parse_progress() {
        let fields = parse_progress(CHUNK);
        assert_eq!(fields["frame"], "120");
        assert_eq!(fields["speed"], "1.5x");
        assert_eq!(fields["progress"], "continue");
    }

    #[test]
    fn test_parse_progress_edge_lines() {
        let fields = parse_progress("garbage\n key = a=b \n\n=empty\n");
        assert_eq!(fields.get("key").map(String::as_str), Some("a=b"));
        assert_eq!(fields.get("").map(String::as_str), Some("empty"));
        assert!(!fields.contains_key("garbage"));
    }

    #[test]
    fn test_parse_out_time() {
        assert_eq!(parse_out_time("00:00:04.000000"), Some(4.0));
        assert_eq!(parse_out_time("01:02:03.500000"), Some(3723.5));
        assert_eq!(parse_out_time("-00:00:00.023220"), Some(-0.02322));
        assert_eq!(parse_out_time("N/A"), None);
        assert_eq!(parse_out_time("12"), None);
    }

    #[test]
    fn test_progress_info_with_duration() {
        let info = progress_info(&parse_progress(CHUNK), Some(10.0));
        assert_eq!(info.current_time, "00:00:04.000000");
        assert_eq!(info.bitrate, "2500.1kbits/s");
        assert_eq!(info.speed, "1.5x");
        assert!((info.percentage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_info_without_duration() {
        let info = progress_info(&parse_progress(CHUNK), None);
        assert_eq!(info.percentage, 0.0);
    }

    #[test]
    fn test_progress_info_end_and_clamp() {
        let end = progress_info(&parse_progress("out_time=00:00:01.000000\nprogress=end\n"), None);
        assert_eq!(end.percentage, 100.0);

        let over = progress_info(&parse_progress("out_time=00:00:30.000000\n"), Some(10.0));
        assert_eq!(over.percentage, 100.0);

        let negative = progress_info(&parse_progress("out_time=-00:00:01.000000\n"), Some(10.0));
        assert_eq!(negative.percentage, 0.0);
    }
}
