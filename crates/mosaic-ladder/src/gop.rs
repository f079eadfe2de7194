/// Smallest keyframe interval ever emitted, in frames.
pub const MIN_GOP: u32 = 24;

/// Largest keyframe interval ever emitted; even, so bumping never overflows.
pub const MAX_GOP: u32 = u32::MAX - 1;

/// Keyframe interval aligned to segment boundaries.
///
/// `round(fps * segment_secs)`, bumped to the next even number and floored at
/// [`MIN_GOP`]. Absurd frame rates saturate at [`MAX_GOP`].
pub fn calc_gop(fps: f64, segment_secs: u32) -> u32 {
    let raw = (fps * segment_secs as f64).round();
    let mut gop = if raw.is_finite() && raw > 0.0 {
        raw.min(MAX_GOP as f64) as u32
    } else {
        0
    };

    if gop % 2 != 0 {
        gop += 1;
    }

    gop.max(MIN_GOP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_frame_rates() {
        assert_eq!(calc_gop(30.0, 5), 150);
        assert_eq!(calc_gop(24.0, 5), 120);
        assert_eq!(calc_gop(29.97, 5), 150);
        assert_eq!(calc_gop(25.0, 2), 50);
        assert_eq!(calc_gop(60.0, 5), 300);
        assert_eq!(calc_gop(23.976, 5), 120);
    }

    #[test]
    fn test_odd_becomes_even() {
        assert_eq!(calc_gop(5.0, 5), 26);
    }

    #[test]
    fn test_minimum() {
        assert_eq!(calc_gop(4.0, 5), 24);
        assert_eq!(calc_gop(0.0, 5), 24);
        assert_eq!(calc_gop(f64::NAN, 5), 24);
    }

    #[test]
    fn test_huge_frame_rate_saturates() {
        assert_eq!(calc_gop(1e10, 5), MAX_GOP);
        assert_eq!(calc_gop(f64::MAX, 10), MAX_GOP);
        assert_eq!(calc_gop(f64::INFINITY, 5), MIN_GOP);
    }

    #[test]
    fn test_even_and_bounded_over_range() {
        for fps in 1..=120 {
            for segment in 1..=10 {
                let gop = calc_gop(fps as f64, segment);
                assert_eq!(gop % 2, 0, "fps={} segment={}", fps, segment);
                assert!(gop >= MIN_GOP, "fps={} segment={}", fps, segment);
            }
        }
    }
}
