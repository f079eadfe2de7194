//! Mosaic-Common: value types shared across the mosaic crates.
//!
//! - **Source metadata**: [`VideoInfo`] as reported by the prober, with
//!   rotation-aware display dimensions
//! - **Ladder entries**: [`Rendition`], one quality level of the output
//! - **Packaging profiles**: [`Profile`] and the [`ProfileKind`] selector
//! - **Encoder knobs**: [`EncoderOptions`] and [`GpuBackend`]
//! - **Execution results**: [`Usage`] and [`ProgressInfo`]
//!
//! # Examples
//!
//! ```
//! use mosaic_common::{Profile, ProfileKind, VideoInfo};
//!
//! let info = VideoInfo {
//!     width: 1920,
//!     height: 1080,
//!     fps: 30.0,
//!     has_audio: true,
//!     rotation: 90,
//!     duration: None,
//! };
//! assert!(info.is_portrait());
//! assert_eq!(Profile::for_kind(ProfileKind::Live).segment_duration, 2);
//! ```

pub mod types;

pub use types::*;
