use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

use tracing::debug;

use super::animated::{AnimatedCounter, Frame, Phase};
use super::config::CounterError;

/// Delay between animation frames (~20 fps, plenty for a key image).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Receives every frame a driver produces, in order.
pub trait FrameSink: Send + 'static {
    fn show(&mut self, frame: &Frame);
}

struct Slot {
    counter: AnimatedCounter,
    sink: Box<dyn FrameSink>,
    last_shown: Option<String>,
}

impl Slot {
    /// Forward `frame` unless it would repaint the same text.
    fn emit(&mut self, frame: Frame) {
        if frame.settled || self.last_shown.as_deref() != Some(frame.text.as_str()) {
            self.sink.show(&frame);
            self.last_shown = Some(frame.text);
        }
    }
}

/// Runs one [`AnimatedCounter`] on a background tick thread.
///
/// At most one tick thread is live per driver. Starting a new animation
/// bumps the epoch so the previous thread exits on its next wake-up, and
/// both the epoch check and the frame hand-off happen under the counter
/// lock. Once [`dispose`](Self::dispose) returns, the sink sees nothing more.
pub struct CounterDriver {
    slot: Arc<Mutex<Slot>>,
    cancel: Arc<AtomicBool>,
    epoch: Arc<AtomicU64>,
    epoch_seq: u64,
    frame_interval: Duration,
}

impl CounterDriver {
    /// Mount `counter`, show its first frame and start ticking.
    pub fn start(counter: AnimatedCounter, sink: Box<dyn FrameSink>) -> Self {
        Self::start_with_interval(counter, sink, FRAME_INTERVAL)
    }

    pub fn start_with_interval(
        counter: AnimatedCounter,
        sink: Box<dyn FrameSink>,
        frame_interval: Duration,
    ) -> Self {
        let mut driver = Self {
            slot: Arc::new(Mutex::new(Slot { counter, sink, last_shown: None })),
            cancel: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
            epoch_seq: 0,
            frame_interval,
        };

        let shared = Arc::clone(&driver.slot);
        let mut slot = lock(&shared);
        let animating = match slot.counter.mount(Instant::now()) {
            Some(frame) => {
                slot.emit(frame);
                slot.counter.phase() == Phase::Animating
            }
            None => false,
        };
        if animating {
            driver.arm_epoch();
        }
        drop(slot);

        if animating {
            driver.spawn_tick();
        }
        driver
    }

    /// Animate toward `target` from the value currently on display.
    pub fn retarget(&mut self, target: f64) -> Result<(), CounterError> {
        let shared = Arc::clone(&self.slot);
        let mut slot = lock(&shared);
        let Some(frame) = slot.counter.retarget(target, Instant::now())? else {
            return Ok(());
        };
        slot.emit(frame);
        let animating = slot.counter.phase() == Phase::Animating;
        if animating {
            // Replaces any in-flight thread: it will see the new epoch.
            self.arm_epoch();
        } else {
            self.disarm();
        }
        drop(slot);

        if animating {
            self.spawn_tick();
        }
        Ok(())
    }

    /// Cancel the animation and release the display. Idempotent.
    pub fn dispose(&mut self) {
        let shared = Arc::clone(&self.slot);
        let mut slot = lock(&shared);
        self.disarm();
        slot.counter.dispose();
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        lock(&self.slot).counter.phase()
    }

    #[cfg(test)]
    pub fn display(&self) -> String {
        lock(&self.slot).counter.display().to_string()
    }

    #[cfg(test)]
    pub fn target(&self) -> f64 {
        lock(&self.slot).counter.config().target
    }

    fn arm_epoch(&mut self) {
        self.epoch_seq = self.epoch_seq.wrapping_add(1);
        self.epoch.store(self.epoch_seq, Ordering::SeqCst);
        self.cancel.store(false, Ordering::SeqCst);
    }

    fn disarm(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.epoch_seq = self.epoch_seq.wrapping_add(1);
        self.epoch.store(self.epoch_seq, Ordering::SeqCst);
    }

    fn spawn_tick(&self) {
        let my_epoch = self.epoch_seq;
        let slot = Arc::clone(&self.slot);
        let cancel = Arc::clone(&self.cancel);
        let epoch = Arc::clone(&self.epoch);
        let interval = self.frame_interval;

        std::thread::spawn(move || {
            loop {
                std::thread::sleep(interval);

                let mut slot = lock(&slot);
                if cancel.load(Ordering::SeqCst) {
                    break;
                }
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    break;
                }

                let Some(frame) = slot.counter.tick(Instant::now()) else {
                    break;
                };
                let (settled, value) = (frame.settled, frame.value);
                slot.emit(frame);
                if settled {
                    debug!(value, display = slot.counter.display(), "counter settled");
                    break;
                }
            }
        });
    }
}

impl Drop for CounterDriver {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::CounterConfig;

    const TICK: Duration = Duration::from_millis(5);

    #[derive(Clone, Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<Frame>>>,
    }

    impl Recorder {
        fn snapshot(&self) -> Vec<Frame> {
            self.frames.lock().unwrap().clone()
        }

        fn count(&self) -> usize {
            self.frames.lock().unwrap().len()
        }
    }

    impl FrameSink for Recorder {
        fn show(&mut self, frame: &Frame) {
            self.frames.lock().unwrap().push(frame.clone());
        }
    }

    fn start(config: CounterConfig, rec: &Recorder) -> CounterDriver {
        let counter = AnimatedCounter::new(config).unwrap();
        CounterDriver::start_with_interval(counter, Box::new(rec.clone()), TICK)
    }

    fn wait_settled(driver: &CounterDriver) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while driver.phase() != Phase::Settled {
            assert!(Instant::now() < deadline, "counter never settled");
            std::thread::sleep(TICK);
        }
    }

    #[test]
    fn runs_to_the_target() {
        let rec = Recorder::default();
        let driver = start(CounterConfig::new(87.0).duration(0.2), &rec);
        wait_settled(&driver);

        let frames = rec.snapshot();
        assert_eq!(frames.first().unwrap().text, "0");
        assert_eq!(frames.last().unwrap().text, "87");
        assert!(frames.last().unwrap().settled);
        assert!(frames.len() > 2);
        for pair in frames.windows(2) {
            assert!(pair[1].value >= pair[0].value);
        }
    }

    #[test]
    fn zero_duration_shows_one_frame() {
        let rec = Recorder::default();
        let driver = start(CounterConfig::new(50.0).duration(0.0), &rec);
        std::thread::sleep(TICK * 10);
        assert_eq!(driver.phase(), Phase::Settled);
        let frames = rec.snapshot();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].text, "50");
    }

    #[test]
    fn dispose_stops_updates() {
        let rec = Recorder::default();
        let mut driver = start(CounterConfig::new(1000.0).duration(10.0), &rec);
        std::thread::sleep(TICK * 10);
        driver.dispose();
        let after_dispose = rec.count();
        assert!(after_dispose >= 1);

        std::thread::sleep(TICK * 20);
        assert_eq!(rec.count(), after_dispose);
        assert_eq!(driver.phase(), Phase::Disposed);
    }

    #[test]
    fn drop_stops_updates() {
        let rec = Recorder::default();
        let driver = start(CounterConfig::new(1000.0).duration(10.0), &rec);
        std::thread::sleep(TICK * 4);
        drop(driver);
        let after_drop = rec.count();
        std::thread::sleep(TICK * 20);
        assert_eq!(rec.count(), after_drop);
    }

    #[test]
    fn retarget_mid_flight_settles_on_new_target() {
        let rec = Recorder::default();
        let mut driver = start(CounterConfig::new(100.0).duration(0.4), &rec);
        std::thread::sleep(Duration::from_millis(100));
        driver.retarget(40.0).unwrap();
        assert_eq!(driver.target(), 40.0);
        wait_settled(&driver);

        let frames = rec.snapshot();
        assert_eq!(frames.last().unwrap().text, "40");
        for f in &frames {
            assert!((0.0..=100.0).contains(&f.value), "overshoot: {}", f.value);
        }
        // A second frame at zero would mean the animation restarted from scratch.
        assert_eq!(frames.iter().filter(|f| f.text == "0").count(), 1);
    }

    #[test]
    fn retarget_after_dispose_is_ignored() {
        let rec = Recorder::default();
        let mut driver = start(CounterConfig::new(10.0).duration(0.0), &rec);
        driver.dispose();
        driver.retarget(20.0).unwrap();
        std::thread::sleep(TICK * 4);
        assert_eq!(rec.count(), 1);
    }

    #[test]
    fn retarget_rejects_non_finite() {
        let rec = Recorder::default();
        let mut driver = start(CounterConfig::new(10.0).duration(0.0), &rec);
        assert!(driver.retarget(f64::INFINITY).is_err());
        assert_eq!(driver.display(), "10");
    }
}
