//! Click ripple effect.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{transition, unit_or, EffectHooks, EffectState};
use crate::clock::Clock;
use crate::gpu::UniformWriter;
use crate::input::{PointerEvent, PointerHandler};
use crate::render::{UniformLocations, UniformSetter, RIPPLE_SENTINEL};

/// Capacity of the `u_ripples` uniform array.
pub const MAX_RIPPLES: usize = 8;

/// Default ripple expansion speed.
pub const DEFAULT_RIPPLE_SPEED: f32 = 30.0;

/// One expanding ring spawned by a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub x: f32,
    pub y: f32,
    /// Spawn time in clock milliseconds
    pub start_time: f64,
}

/// How long a ripple lives as a function of its speed.
///
/// A ripple travels `travel` speed-units before it is pruned, so the
/// lifetime is `travel / speed` seconds, clamped to
/// `[min_lifetime_ms, max_lifetime_ms]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleTuning {
    pub travel: f32,
    pub min_lifetime_ms: f64,
    pub max_lifetime_ms: f64,
}

impl Default for RippleTuning {
    fn default() -> Self {
        Self {
            travel: 60.0,
            min_lifetime_ms: 100.0,
            max_lifetime_ms: 10_000.0,
        }
    }
}

impl RippleTuning {
    /// Lifetime in milliseconds for ripples moving at `speed`.
    ///
    /// # Arguments
    /// * `speed` - Ripple speed; non-positive or non-finite values use
    ///   [`DEFAULT_RIPPLE_SPEED`]
    pub fn lifetime_ms(&self, speed: f32) -> f64 {
        let speed = sanitize_speed(speed);
        let raw = f64::from(self.travel) / f64::from(speed) * 1000.0;
        let (lo, hi) = if self.min_lifetime_ms <= self.max_lifetime_ms {
            (self.min_lifetime_ms, self.max_lifetime_ms)
        } else {
            (self.max_lifetime_ms, self.min_lifetime_ms)
        };
        if raw.is_finite() {
            raw.clamp(lo, hi)
        } else {
            hi
        }
    }
}

fn sanitize_speed(speed: f32) -> f32 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        DEFAULT_RIPPLE_SPEED
    }
}

/// Bounded, insertion-ordered list of live ripples.
#[derive(Debug, Clone)]
pub struct RippleField {
    ripples: VecDeque<Ripple>,
    speed: f32,
    tuning: RippleTuning,
    epoch_ms: f64,
}

impl RippleField {
    /// Create an empty field. Shader times are seconds since `epoch_ms`.
    pub fn new(speed: f32, tuning: RippleTuning, epoch_ms: f64) -> Self {
        Self {
            ripples: VecDeque::with_capacity(MAX_RIPPLES),
            speed: sanitize_speed(speed),
            tuning,
            epoch_ms,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = sanitize_speed(speed);
    }

    pub fn tuning(&self) -> RippleTuning {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: RippleTuning) {
        self.tuning = tuning;
    }

    /// Current lifetime of a ripple in milliseconds.
    pub fn lifetime_ms(&self) -> f64 {
        self.tuning.lifetime_ms(self.speed)
    }

    /// Add a ripple at `(x, y)`. The oldest ripple is dropped when the field
    /// is full.
    pub fn spawn(&mut self, x: f32, y: f32, now_ms: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        if self.ripples.len() == MAX_RIPPLES {
            self.ripples.pop_front();
        }
        self.ripples.push_back(Ripple {
            x: unit_or(x, 0.0),
            y: unit_or(y, 0.0),
            start_time: now_ms,
        });
    }

    /// Drop every ripple older than the lifetime.
    pub fn prune(&mut self, now_ms: f64) {
        let lifetime = self.lifetime_ms();
        self.ripples.retain(|r| now_ms - r.start_time <= lifetime);
    }

    /// Live ripples, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &Ripple> {
        self.ripples.iter()
    }

    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }

    pub fn clear(&mut self) {
        self.ripples.clear();
    }

    fn seconds(&self, ms: f64) -> f32 {
        ((ms - self.epoch_ms) / 1000.0) as f32
    }

    /// Prune, then write `u_time`, `u_rippleEnabled`, `u_rippleSpeed` and
    /// every `u_ripples` slot.
    pub fn write_uniforms(
        &mut self,
        gpu: &mut dyn UniformWriter,
        locations: &UniformLocations,
        now_ms: f64,
    ) {
        self.prune(now_ms);

        gpu.put_float(locations.time, self.seconds(now_ms));
        gpu.put_int(locations.ripple_enabled, 1);
        gpu.put_float(locations.ripple_speed, self.speed);

        let mut live = self.ripples.iter();
        for location in &locations.ripples {
            let value = match live.next() {
                Some(r) => [r.x, r.y, self.seconds(r.start_time)],
                None => RIPPLE_SENTINEL,
            };
            gpu.put_vec3(*location, value);
        }
    }
}

/// Ripple effect: clicks spawn ripples timestamped by the clock.
pub struct RippleEffect {
    field: Rc<RefCell<RippleField>>,
    clock: Rc<dyn Clock>,
    state: EffectState,
}

impl RippleEffect {
    /// Registry id of the ripple effect.
    pub const ID: &'static str = "ripple";

    pub fn new(speed: f32, tuning: RippleTuning, clock: Rc<dyn Clock>) -> Self {
        let epoch = clock.now_ms();
        Self {
            field: Rc::new(RefCell::new(RippleField::new(speed, tuning, epoch))),
            clock,
            state: EffectState::Inactive,
        }
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == EffectState::Active
    }

    /// Shared handle to the ripple list.
    pub fn field(&self) -> Rc<RefCell<RippleField>> {
        Rc::clone(&self.field)
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.field.borrow_mut().set_speed(speed);
    }

    pub fn set_tuning(&mut self, tuning: RippleTuning) {
        self.field.borrow_mut().set_tuning(tuning);
    }

    /// Enter Active (register + attach) or Inactive (unregister + detach).
    pub fn set_enabled(&mut self, enabled: bool, hooks: &mut EffectHooks<'_>) -> bool {
        let field = Rc::clone(&self.field);
        let clock = Rc::clone(&self.clock);
        let changed = transition(&mut self.state, enabled, Self::ID, hooks, move || {
            let setter_field = Rc::clone(&field);
            let setter_clock = Rc::clone(&clock);
            let setter: UniformSetter = Box::new(move |gpu, locations| {
                let now = setter_clock.now_ms();
                setter_field.borrow_mut().write_uniforms(gpu, locations, now)
            });
            let handler: PointerHandler = Box::new(move |event| {
                if let PointerEvent::Click { x, y } = *event {
                    field.borrow_mut().spawn(x, y, clock.now_ms());
                }
            });
            (setter, Some(handler))
        });
        if changed && !enabled {
            self.field.borrow_mut().clear();
        }
        changed
    }
}

impl std::fmt::Debug for RippleEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleEffect")
            .field("field", &self.field)
            .field("state", &self.state)
            .finish()
    }
}
