use thiserror::Error;

use super::easing::Easing;

/// Default animation length in seconds.
pub const DEFAULT_DURATION_SECS: f64 = 2.0;

/// Highest supported number of decimals. Beyond this `f64` has no digits left to show.
pub const MAX_PRECISION: u32 = 15;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CounterError {
    #[error("counter target must be a finite number, got {0}")]
    NonFiniteTarget(f64),
    #[error("counter duration must be a finite number of seconds, got {0}")]
    NonFiniteDuration(f64),
    #[error("precision must not be negative, got {0}")]
    NegativePrecision(i64),
    #[error("precision {precision} is out of range (max {max})")]
    PrecisionOutOfRange { precision: u32, max: u32 },
}

/// Immutable description of one counter animation.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterConfig {
    pub target: f64,
    pub duration_secs: f64,
    pub precision: u32,
    pub prefix: String,
    pub suffix: String,
    pub easing: Easing,
}

impl CounterConfig {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            duration_secs: DEFAULT_DURATION_SECS,
            precision: 0,
            prefix: String::new(),
            suffix: String::new(),
            easing: Easing::default(),
        }
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn precision(mut self, decimals: u32) -> Self {
        self.precision = decimals;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn validate(&self) -> Result<(), CounterError> {
        check_target(self.target)?;
        if !self.duration_secs.is_finite() {
            return Err(CounterError::NonFiniteDuration(self.duration_secs));
        }
        if self.precision > MAX_PRECISION {
            return Err(CounterError::PrecisionOutOfRange {
                precision: self.precision,
                max: MAX_PRECISION,
            });
        }
        Ok(())
    }

    /// A zero or negative duration means "show the target right away".
    pub fn snaps(&self) -> bool {
        self.duration_secs <= 0.0
    }
}

pub(crate) fn check_target(target: f64) -> Result<(), CounterError> {
    if target.is_finite() {
        Ok(())
    } else {
        Err(CounterError::NonFiniteTarget(target))
    }
}

/// Convert a signed decimal count coming from settings into a precision.
pub fn precision_from_i64(decimals: i64) -> Result<u32, CounterError> {
    if decimals < 0 {
        return Err(CounterError::NegativePrecision(decimals));
    }
    u32::try_from(decimals)
        .ok()
        .filter(|p| *p <= MAX_PRECISION)
        .ok_or(CounterError::PrecisionOutOfRange {
            precision: u32::try_from(decimals).unwrap_or(u32::MAX),
            max: MAX_PRECISION,
        })
}
