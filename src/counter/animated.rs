use std::time::{Duration, Instant};

use tracing::debug;

use super::config::{CounterConfig, CounterError, check_target};
use super::format::format_value;
use super::interpolation::Interpolation;

/// Lifecycle of one mounted counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Built but not mounted; emits nothing.
    Idle,
    Animating,
    Settled,
    /// Torn down. Terminal.
    Disposed,
}

/// One rendered step of the animation.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub value: f64,
    pub text: String,
    pub settled: bool,
}

/// Counter state for a single display, advanced by explicit timestamps.
///
/// The counter never reads the clock itself: callers pass `now` to
/// [`mount`](Self::mount), [`tick`](Self::tick) and
/// [`retarget`](Self::retarget), which keeps it usable from a frame loop,
/// a timer thread or a test.
#[derive(Debug)]
pub struct AnimatedCounter {
    config: CounterConfig,
    phase: Phase,
    value: f64,
    display: String,
    leg: Option<(Interpolation, Instant)>,
}

impl AnimatedCounter {
    pub fn new(config: CounterConfig) -> Result<Self, CounterError> {
        config.validate()?;
        let display = format_value(0.0, config.precision, &config.prefix, &config.suffix);
        Ok(Self {
            config,
            phase: Phase::Idle,
            value: 0.0,
            display,
            leg: None,
        })
    }

    #[cfg(test)]
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current display string. Before mount this is the zero value.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Start animating from zero. Returns the first frame, or `None` if the
    /// counter was already mounted or disposed.
    pub fn mount(&mut self, now: Instant) -> Option<Frame> {
        if self.phase != Phase::Idle {
            return None;
        }
        debug!(target = self.config.target, "mounting counter");
        self.begin_leg(0.0, now);
        Some(self.frame())
    }

    /// Advance to `now`. Emits a frame only while animating; the frame that
    /// reaches the target moves the counter to [`Phase::Settled`].
    pub fn tick(&mut self, now: Instant) -> Option<Frame> {
        if self.phase != Phase::Animating {
            return None;
        }
        let (leg, started) = self.leg?;
        let elapsed = now.saturating_duration_since(started);
        self.set_value(leg.value_at(elapsed));
        if leg.is_settled(elapsed) {
            self.settle();
        }
        Some(self.frame())
    }

    /// Point the counter at a new target, continuing from wherever the
    /// display currently is.
    ///
    /// An idle counter only records the target for its upcoming mount and a
    /// disposed one ignores the call; neither emits a frame.
    pub fn retarget(&mut self, target: f64, now: Instant) -> Result<Option<Frame>, CounterError> {
        check_target(target)?;
        match self.phase {
            Phase::Disposed => return Ok(None),
            Phase::Idle => {
                self.config.target = target;
                return Ok(None);
            }
            Phase::Animating => {
                if let Some((leg, started)) = self.leg {
                    self.set_value(leg.value_at(now.saturating_duration_since(started)));
                }
            }
            Phase::Settled => {}
        }
        debug!(from = self.value, to = target, "retargeting counter");
        self.config.target = target;
        self.begin_leg(self.value, now);
        Ok(Some(self.frame()))
    }

    /// Tear the counter down. Later calls emit nothing.
    pub fn dispose(&mut self) {
        if self.phase != Phase::Disposed {
            debug!(value = self.value, "disposing counter");
        }
        self.phase = Phase::Disposed;
        self.leg = None;
    }

    fn begin_leg(&mut self, from: f64, now: Instant) {
        let target = self.config.target;
        self.set_value(from);
        if self.config.snaps() || from == target {
            self.set_value(target);
            self.settle();
            return;
        }
        let duration =
            Duration::try_from_secs_f64(self.config.duration_secs).unwrap_or(Duration::MAX);
        let leg = Interpolation::new(from, target, duration, self.config.easing);
        self.leg = Some((leg, now));
        self.phase = Phase::Animating;
    }

    fn settle(&mut self) {
        self.leg = None;
        self.phase = Phase::Settled;
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
        let c = &self.config;
        self.display = format_value(value, c.precision, &c.prefix, &c.suffix);
    }

    fn frame(&self) -> Frame {
        Frame {
            value: self.value,
            text: self.display.clone(),
            settled: self.phase == Phase::Settled,
        }
    }
}
