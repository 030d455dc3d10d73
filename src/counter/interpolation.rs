use std::time::Duration;

use super::easing::Easing;

/// One leg of an animation: `from` to `to` over `duration`.
///
/// Pure function of elapsed time; scheduling lives in [`super::driver`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolation {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Interpolation {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self { from, to, duration, easing }
    }

    pub fn is_settled(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if self.is_settled(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let v = self.from + (self.to - self.from) * self.easing.progress(t);
        // Float error must not push the value past either end.
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        v.clamp(lo, hi)
    }
}
