//! Packaging pipeline: probe, normalize, plan the ladder, run ffmpeg.

mod packager;

pub use packager::{PackageReport, Packager};
