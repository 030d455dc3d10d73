use serde::{Deserialize, Serialize};

/// Angular frequency of the critically damped curve, in units of the
/// animation duration. At 8 the raw spring has covered ~99.7% of the
/// distance when the duration runs out; the remainder is normalised away.
const SPRING_OMEGA: f64 = 8.0;

/// Shape of the interpolation between the start and target values.
///
/// Every curve maps `[0, 1]` onto `[0, 1]`, starts at 0, ends exactly at 1
/// and never decreases, so the displayed number can neither overshoot nor
/// oscillate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// Zero-bounce spring: fast start, long soft landing.
    #[default]
    CriticallyDamped,
    EaseOutCubic,
    Linear,
}

impl Easing {
    /// Progress for normalised time `t`. Inputs outside `[0, 1]` are clamped.
    pub fn progress(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let p = match self {
            Easing::CriticallyDamped => spring(t) / spring(1.0),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::Linear => t,
        };
        p.clamp(0.0, 1.0)
    }
}

/// Unit step response of a critically damped oscillator:
/// `x(t) = 1 - (1 + wt) e^(-wt)`, monotonic for `t >= 0`.
fn spring(t: f64) -> f64 {
    let wt = SPRING_OMEGA * t;
    1.0 - (1.0 + wt) * (-wt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [Easing::CriticallyDamped, Easing::EaseOutCubic, Easing::Linear];

    #[test]
    fn endpoints_are_exact() {
        for e in ALL {
            assert_eq!(e.progress(0.0), 0.0, "{e:?}");
            assert_eq!(e.progress(1.0), 1.0, "{e:?}");
            assert_eq!(e.progress(-3.0), 0.0, "{e:?}");
            assert_eq!(e.progress(7.0), 1.0, "{e:?}");
            assert_eq!(e.progress(f64::NAN), 0.0, "{e:?}");
        }
    }

    #[test]
    fn curves_are_monotonic_and_bounded() {
        for e in ALL {
            let mut prev = 0.0;
            for i in 0..=1000 {
                let p = e.progress(i as f64 / 1000.0);
                assert!(p >= prev, "{e:?} decreased at step {i}");
                assert!((0.0..=1.0).contains(&p), "{e:?} left [0,1] at step {i}");
                prev = p;
            }
        }
    }

    #[test]
    fn spring_decelerates() {
        // Most of the distance is covered in the first half.
        assert!(Easing::CriticallyDamped.progress(0.5) > 0.85);
        assert!(Easing::EaseOutCubic.progress(0.5) > 0.85);
    }

    #[test]
    fn deserializes_camel_case() {
        let e: Easing = serde_json::from_str("\"easeOutCubic\"").unwrap();
        assert_eq!(e, Easing::EaseOutCubic);
    }
}
