//! L4 Atomic Layer: Time calculation utilities for motions and rate transitions
//!
//! Pure functions; callers supply elapsed time so everything stays deterministic
//! under a frame-driven clock.

use std::time::Duration;

/// Calculate progress (0.0 to 1.0) from elapsed and total time in seconds
///
/// A zero (or negative) duration is complete as soon as it starts.
#[inline]
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return if elapsed >= 0.0 { 1.0 } else { 0.0 };
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Same as [`progress`] for wall-clock durations
#[inline]
pub fn progress_of(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    progress(elapsed.as_secs_f64(), duration.as_secs_f64())
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Round `value` to the nearest multiple of `increment`
#[inline]
pub fn snap_to(value: f64, increment: f64) -> f64 {
    (value / increment).round() * increment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 1.0) - 100.0).abs() < 0.001);
        assert!((lerp(-4.5, -1.5, 1.0) + 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert_eq!(progress(0.0, 0.0), 1.0);
        assert_eq!(progress(-0.1, 0.0), 0.0);
        assert_eq!(progress_of(Duration::ZERO, Duration::ZERO), 1.0);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(2.0, 1.0), 1.0);
        assert_eq!(progress(-1.0, 1.0), 0.0);
        assert!((progress_of(Duration::from_millis(250), Duration::from_millis(500)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_snap_to() {
        assert_eq!(snap_to(-209.6, 1.0), -210.0);
        assert_eq!(snap_to(12.4, 5.0), 10.0);
        assert_eq!(snap_to(0.26, 0.5), 0.5);
    }
}
