//! Candidate ladder construction.

use mosaic_common::{Rendition, VideoInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with a source whose display height is below the smallest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowResolutionPolicy {
    /// Emit a single baseline 360p-class rendition (upscaled).
    #[default]
    ForceBaseline,
    /// Emit nothing; the caller decides how to handle an empty ladder.
    Skip,
}

impl fmt::Display for LowResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceBaseline => write!(f, "force_baseline"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for LowResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "force_baseline" | "baseline" => Ok(Self::ForceBaseline),
            "skip" => Ok(Self::Skip),
            other => Err(format!("Unknown low-resolution policy: {}", other)),
        }
    }
}

struct Tier {
    min_height: u32,
    width: u32,
    height: u32,
    max_rate: u32,
    buf_size: u32,
    profile: &'static str,
    level: &'static str,
}

impl Tier {
    fn rendition(&self) -> Rendition {
        Rendition::new(
            self.width,
            self.height,
            self.max_rate,
            self.buf_size,
            self.profile,
            self.level,
        )
    }
}

/// Landscape tiers, highest first.
const TIERS: [Tier; 3] = [
    Tier {
        min_height: 1080,
        width: 1920,
        height: 1080,
        max_rate: 5200,
        buf_size: 10400,
        profile: "main",
        level: "4.0",
    },
    Tier {
        min_height: 720,
        width: 1280,
        height: 720,
        max_rate: 3000,
        buf_size: 6000,
        profile: "main",
        level: "3.1",
    },
    Tier {
        min_height: 360,
        width: 640,
        height: 360,
        max_rate: 1000,
        buf_size: 2000,
        profile: "baseline",
        level: "3.0",
    },
];

/// Build the candidate ladder for a source using the default
/// [`LowResolutionPolicy::ForceBaseline`].
///
/// Tiers are chosen on the display height; portrait sources get every
/// rendition with width and height exchanged. Renditions come out in
/// decreasing height order.
pub fn build(info: &VideoInfo) -> Vec<Rendition> {
    build_with_policy(info, LowResolutionPolicy::default())
}

/// Build the candidate ladder with an explicit policy for sources below 360p.
pub fn build_with_policy(info: &VideoInfo, policy: LowResolutionPolicy) -> Vec<Rendition> {
    let height = info.display_height();
    let portrait = info.is_portrait();

    let mut out: Vec<Rendition> = TIERS
        .iter()
        .filter(|tier| height >= tier.min_height)
        .map(Tier::rendition)
        .collect();

    if out.is_empty() && policy == LowResolutionPolicy::ForceBaseline {
        if let Some(lowest) = TIERS.last() {
            tracing::debug!(
                height,
                "Source below smallest tier, forcing baseline rendition"
            );
            out.push(lowest.rendition());
        }
    }

    if portrait {
        out = out.into_iter().map(Rendition::transposed).collect();
    }

    out
}
