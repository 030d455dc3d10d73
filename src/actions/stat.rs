use serde_json::{Map, Value};
use streamdeck_lib::prelude::*;
use tracing::{debug, warn};

use crate::counter::config::precision_from_i64;
use crate::counter::{AnimatedCounter, CounterConfig, CounterDriver, CounterError, Easing};
use crate::render::{FALLBACK_TEXT, KeySink, render_text};
use crate::tile::Preset;

/// One tile metric on one key: counts up to its value whenever it appears.
#[derive(Default)]
pub struct StatAction {
    driver: Option<CounterDriver>,
    settings: KeyState,
}

/// What the key last learned from its settings.
#[derive(Clone, Debug, Default, PartialEq)]
enum KeyState {
    /// Settings not received yet.
    #[default]
    Pending,
    Valid(CounterConfig),
    /// Settings arrived but cannot produce a counter; the key shows the fallback.
    Invalid,
}

/// Next step for the key's display.
#[derive(Clone, Debug, PartialEq)]
enum Plan {
    Keep,
    Retarget(CounterConfig),
    Mount(CounterConfig),
    Fallback,
}

/// Settings arrived. Only a changed `value` keeps the running animation;
/// anything else starts over from zero.
fn plan_settings(
    state: &KeyState,
    running: bool,
    incoming: Result<CounterConfig, CounterError>,
) -> Plan {
    let config = match incoming {
        Ok(config) => config,
        Err(_) => return Plan::Fallback,
    };
    match state {
        KeyState::Valid(old) if running => {
            if *old == config {
                Plan::Keep
            } else if differs_only_in_target(old, &config) {
                Plan::Retarget(config)
            } else {
                Plan::Mount(config)
            }
        }
        _ => Plan::Mount(config),
    }
}

/// The key became visible again: images are not kept across page switches.
fn plan_appear(state: &KeyState, running: bool) -> Plan {
    match state {
        _ if running => Plan::Keep,
        KeyState::Pending => Plan::Keep,
        KeyState::Valid(config) => Plan::Mount(config.clone()),
        KeyState::Invalid => Plan::Fallback,
    }
}

impl ActionStatic for StatAction {
    const ID: &'static str = super::ids::STAT;
}

impl Action for StatAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn init(&mut self, cx: &Context, ctx_id: &str) {
        cx.sd().get_settings(ctx_id);
    }

    fn did_receive_settings(&mut self, cx: &Context, ev: &incoming::DidReceiveSettings) {
        let parsed = parse_settings(&ev.settings);
        if let Err(err) = &parsed {
            warn!(context = ev.context, %err, "invalid stat settings");
        }
        let plan = plan_settings(&self.settings, self.driver.is_some(), parsed);
        self.execute(cx, ev.context, plan);
    }

    fn will_appear(&mut self, cx: &Context, ev: &incoming::WillAppear) {
        let plan = plan_appear(&self.settings, self.driver.is_some());
        self.execute(cx, ev.context, plan);
    }

    fn will_disappear(&mut self, _cx: &Context, _ev: &incoming::WillDisappear) {
        // Settings stay so will_appear can replay
        self.stop();
    }

    fn teardown(&mut self, _cx: &Context, _ctx_id: &str) {
        self.stop();
    }
}

impl StatAction {
    fn execute(&mut self, cx: &Context, ctx_id: &str, plan: Plan) {
        match plan {
            Plan::Keep => {}
            Plan::Retarget(config) => {
                let Some(driver) = self.driver.as_mut() else {
                    return self.mount(cx, ctx_id, config);
                };
                match driver.retarget(config.target) {
                    Ok(()) => self.settings = KeyState::Valid(config),
                    Err(err) => {
                        warn!(context = ctx_id, %err, "retarget failed, remounting");
                        self.mount(cx, ctx_id, config);
                    }
                }
            }
            Plan::Mount(config) => self.mount(cx, ctx_id, config),
            Plan::Fallback => self.fallback(cx, ctx_id),
        }
    }

    fn mount(&mut self, cx: &Context, ctx_id: &str, config: CounterConfig) {
        self.stop();
        match AnimatedCounter::new(config.clone()) {
            Ok(counter) => {
                debug!(context = ctx_id, display_target = config.target, "mounting stat");
                let sink = Box::new(KeySink::new(cx, ctx_id));
                self.driver = Some(CounterDriver::start(counter, sink));
                self.settings = KeyState::Valid(config);
            }
            Err(err) => {
                warn!(context = ctx_id, %err, "cannot mount stat");
                self.fallback(cx, ctx_id);
            }
        }
    }

    fn fallback(&mut self, cx: &Context, ctx_id: &str) {
        self.stop();
        self.settings = KeyState::Invalid;
        render_text(cx, ctx_id, FALLBACK_TEXT);
    }

    fn stop(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.dispose();
        }
    }
}

fn differs_only_in_target(old: &CounterConfig, new: &CounterConfig) -> bool {
    CounterConfig { target: new.target, ..old.clone() } == *new
}

// ── Settings ────────────────────────────────────────────────────────────────

/// Build the counter for a key: start from the chosen preset (or an empty
/// custom metric) and let explicit fields override it.
fn parse_settings(v: &Map<String, Value>) -> Result<CounterConfig, CounterError> {
    let preset = get_preset(v);
    let mut c = preset.map(Preset::config).unwrap_or_else(|| CounterConfig::new(0.0));
    if let Some(p) = preset {
        debug!(preset = p.label(), "using tile preset");
    }

    if let Some(value) = get_f64(v, "value") {
        c.target = value;
    }
    if let Some(secs) = get_f64(v, "durationSecs") {
        c.duration_secs = secs;
    }
    if let Some(decimals) = get_i64(v, "toFixed") {
        c.precision = precision_from_i64(decimals)?;
    }
    if let Some(prefix) = get_str(v, "prefix") {
        c.prefix = prefix.to_string();
    }
    if let Some(suffix) = get_str(v, "suffix") {
        c.suffix = suffix.to_string();
    }
    if let Some(easing) = get_easing(v, "easing") {
        c = c.easing(easing);
    }

    c.validate()?;
    Ok(c)
}

fn get_preset(v: &Map<String, Value>) -> Option<Preset> {
    v.get("preset")
        .and_then(|p| serde_json::from_value(p.clone()).ok())
}

fn get_easing(v: &Map<String, Value>, k: &str) -> Option<Easing> {
    v.get(k).and_then(|e| serde_json::from_value(e.clone()).ok())
}

fn get_str<'a>(v: &'a Map<String, Value>, k: &str) -> Option<&'a str> {
    v.get(k)?.as_str()
}

fn get_f64(v: &Map<String, Value>, k: &str) -> Option<f64> {
    match v.get(k) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn get_i64(v: &Map<String, Value>, k: &str) -> Option<i64> {
    match v.get(k) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
