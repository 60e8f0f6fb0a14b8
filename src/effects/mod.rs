//! Interactive effects layered on top of the ASCII render.
//!
//! Each effect owns a small piece of plain state and contributes to the
//! frame only through a uniform setter. Effects never touch the GPU.
//!
//! An effect is a two-state machine driven by its enable flag:
//!
//! ```text
//!            set_enabled(true)
//!  Inactive ───────────────────► Active    registers setter, attaches pointer handler
//!      ▲                           │
//!      └───────────────────────────┘
//!            set_enabled(false)             unregisters setter, detaches pointer handler
//! ```
//!
//! Pointer events mutate state between ticks; the next tick's setter picks
//! the change up.

mod audio;
mod mouse;
mod ripple;

pub use audio::{AudioEffect, AudioLevel, AudioReactivity, AudioTuning, DEFAULT_AUDIO_RANGE};
pub use mouse::{
    MouseTrail, MouseTrailEffect, DEFAULT_MOUSE_RADIUS, DEFAULT_TRAIL_LENGTH, MAX_TRAIL_LENGTH,
};
pub use ripple::{
    Ripple, RippleEffect, RippleField, RippleTuning, DEFAULT_RIPPLE_SPEED, MAX_RIPPLES,
};

use crate::input::{PointerHandler, PointerHandlers};
use crate::render::{UniformSetter, UniformSetterRegistry};

/// Lifecycle state of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectState {
    #[default]
    Inactive,
    Active,
}

/// The registries an effect attaches itself to.
pub struct EffectHooks<'a> {
    pub setters: &'a mut UniformSetterRegistry,
    pub pointer: &'a mut PointerHandlers,
}

impl<'a> EffectHooks<'a> {
    pub fn new(setters: &'a mut UniformSetterRegistry, pointer: &'a mut PointerHandlers) -> Self {
        Self { setters, pointer }
    }
}

/// Move `state` towards `enabled`, attaching or detaching under `id`.
///
/// `attach` is only called on the Inactive -> Active edge and returns the
/// setter plus an optional pointer handler. Returns true when the state
/// changed.
pub(crate) fn transition(
    state: &mut EffectState,
    enabled: bool,
    id: &str,
    hooks: &mut EffectHooks<'_>,
    attach: impl FnOnce() -> (UniformSetter, Option<PointerHandler>),
) -> bool {
    match (*state, enabled) {
        (EffectState::Inactive, true) => {
            let (setter, handler) = attach();
            hooks.setters.register(id, setter);
            if let Some(handler) = handler {
                hooks.pointer.attach(id, handler);
            }
            *state = EffectState::Active;
            log::info!("Effect '{}' activated", id);
            true
        }
        (EffectState::Active, false) => {
            hooks.setters.unregister(id);
            hooks.pointer.detach(id);
            *state = EffectState::Inactive;
            log::info!("Effect '{}' deactivated", id);
            true
        }
        _ => false,
    }
}

/// Clamp a value to `[0, 1]`, mapping non-finite input to `fallback`.
pub(crate) fn unit_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
