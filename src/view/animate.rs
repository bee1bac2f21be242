//! Linear value animation.
//!
//! A `Tween` moves a displayed number from its old value to a new one over a
//! fixed duration. It is evaluated against an injected clock, so the same
//! tween renders identically in tests and in the terminal loop.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    start: DateTime<Utc>,
    duration: Duration,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: DateTime<Utc>, duration: Duration) -> Self {
        Self { from, to, start, duration }
    }

    /// Fraction of the animation completed at `now`, clamped to `0.0..=1.0`.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.duration.num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let elapsed = (now - self.start).num_milliseconds();
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: DateTime<Utc>) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * t
        }
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.progress(now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tween_is_linear() {
        let tween = Tween::new(0.0, 10.0, t0(), Duration::milliseconds(1000));
        assert_eq!(tween.value_at(t0()), 0.0);
        assert_eq!(tween.value_at(t0() + Duration::milliseconds(250)), 2.5);
        assert_eq!(tween.value_at(t0() + Duration::milliseconds(500)), 5.0);
        assert_eq!(tween.value_at(t0() + Duration::milliseconds(1000)), 10.0);
    }

    #[test]
    fn test_tween_clamps_outside_its_window() {
        let tween = Tween::new(8.0, 6.0, t0(), Duration::milliseconds(800));
        assert_eq!(tween.value_at(t0() - Duration::seconds(5)), 8.0);
        assert_eq!(tween.value_at(t0() + Duration::seconds(5)), 6.0);
        assert!(tween.is_finished(t0() + Duration::milliseconds(800)));
        assert!(!tween.is_finished(t0() + Duration::milliseconds(799)));
    }

    #[test]
    fn test_zero_duration_jumps_to_target() {
        let tween = Tween::new(1.0, 4.0, t0(), Duration::zero());
        assert_eq!(tween.value_at(t0()), 4.0);
    }
}
