//! ffprobe JSON output model.

use mosaic_common::normalize_rotation;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    #[serde(default)]
    pub format: Option<FfprobeFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FfprobeFormat {
    pub duration: Option<String>,
}

impl FfprobeFormat {
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FfprobeStream {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub avg_frame_rate: Option<String>,
    pub codec_name: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, Value>,
    #[serde(default)]
    pub side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FfprobeSideData {
    pub rotation: Option<Value>,
}

impl FfprobeStream {
    /// Clockwise rotation in `[0, 360)`.
    ///
    /// The first side-data entry with a usable rotation wins; the legacy
    /// `rotate` tag is only consulted when no side data parses.
    pub fn rotation(&self) -> u32 {
        let from_side_data = self
            .side_data_list
            .iter()
            .find_map(|sd| sd.rotation.as_ref().and_then(rotation_value));

        from_side_data
            .or_else(|| self.tags.get("rotate").and_then(rotation_value))
            .map(normalize_rotation)
            .unwrap_or(0)
    }
}

/// Interpret a JSON number or numeric string as whole degrees.
pub(crate) fn rotation_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.round() as i64)
            })
        }
        _ => None,
    }
}
