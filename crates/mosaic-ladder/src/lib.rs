//! # mosaic-ladder
//!
//! Pure decision logic for adaptive-bitrate packaging:
//!
//! - [`build`] picks candidate renditions from the source's display resolution
//! - [`optimize::apply`] caps bitrates per resolution tier and drops renditions
//!   that are too close to their neighbour
//! - [`calc_gop`] derives a keyframe interval aligned to segment boundaries
//!
//! Nothing in this crate performs I/O or fails.
//!
//! ## Example
//!
//! ```
//! use mosaic_common::VideoInfo;
//! use mosaic_ladder::{build, optimize};
//!
//! let info = VideoInfo {
//!     width: 1920,
//!     height: 1080,
//!     fps: 30.0,
//!     has_audio: true,
//!     rotation: 0,
//!     duration: None,
//! };
//! let ladder = optimize::apply(build(&info));
//! assert_eq!(ladder[0].max_rate, 5000);
//! assert_eq!(ladder[0].buf_size, 10000);
//! ```

mod gop;
pub mod ladder;
pub mod optimize;

pub use gop::calc_gop;
pub use ladder::{build, build_with_policy, LowResolutionPolicy};
