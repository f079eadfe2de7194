//! Bitrate capping and redundancy trimming.
//!
//! Trimming is idempotent, so re-running [`apply`] on its own output never
//! changes which renditions are present. Rates follow the cascading caps and
//! only stay fixed once they reach a tier's floor.

use mosaic_common::Rendition;

/// Renditions whose height ratio to the previously kept one reaches this
/// value are considered redundant.
pub const TRIM_RATIO: f64 = 0.7;

/// Cap a bitrate (kbps) according to the resolution tier of `height`.
///
/// The rules cascade: a 1080p-class rendition under 5000 kbps can still be
/// capped to 3000 or 1000 by the lower rules.
pub fn cap_bitrate(height: u32, bitrate: u32) -> u32 {
    if height >= 1080 && bitrate > 5000 {
        5000
    } else if height >= 720 && bitrate > 3000 {
        3000
    } else if bitrate > 1000 {
        1000
    } else {
        bitrate
    }
}

/// Cap every rendition's peak rate and set its buffer to twice that rate.
pub fn cap_each(ladder: Vec<Rendition>) -> Vec<Rendition> {
    ladder
        .into_iter()
        .map(|mut r| {
            r.max_rate = cap_bitrate(r.height, r.max_rate);
            r.buf_size = r.max_rate * 2;
            r
        })
        .collect()
}

/// Keep the first rendition, then each later one that is meaningfully smaller
/// than the last one kept.
pub fn trim(ladder: Vec<Rendition>) -> Vec<Rendition> {
    let mut kept: Vec<Rendition> = Vec::with_capacity(ladder.len());

    for r in ladder {
        match kept.last() {
            Some(last) if last.height > 0 => {
                let ratio = r.height as f64 / last.height as f64;
                if ratio < TRIM_RATIO {
                    kept.push(r);
                } else {
                    tracing::trace!(
                        height = r.height,
                        previous = last.height,
                        "Dropping redundant rendition"
                    );
                }
            }
            Some(_) => {}
            None => kept.push(r),
        }
    }

    kept
}

/// Cap bitrates then trim redundant renditions.
pub fn apply(ladder: Vec<Rendition>) -> Vec<Rendition> {
    trim(cap_each(ladder))
}
