//! Animated numeric counter.
//!
//! The math ([`Interpolation`], [`AnimatedCounter`]) is driven by explicit
//! timestamps; [`CounterDriver`] is the thread-based scheduler that feeds it
//! real time and pushes frames into a [`FrameSink`].

pub mod animated;
pub mod config;
pub mod driver;
pub mod easing;
pub mod format;
pub mod interpolation;

pub use animated::{AnimatedCounter, Frame, Phase};
pub use config::{CounterConfig, CounterError};
pub use driver::{CounterDriver, FrameSink};
pub use easing::Easing;
