//! Audio reactivity effect.
//!
//! The level itself is measured elsewhere. The supplier writes the latest
//! sample into a shared [`AudioLevel`]; smoothing, if any, happens on that
//! side. This effect only scales and clamps it into shader range.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{transition, EffectHooks, EffectState};
use crate::gpu::UniformWriter;
use crate::render::{UniformLocations, UniformSetter};

/// Default audio sensitivity (`audio_range`).
pub const DEFAULT_AUDIO_RANGE: f32 = 50.0;

/// Shared slot holding the most recent audio level sample.
#[derive(Debug, Clone, Default)]
pub struct AudioLevel(Rc<Cell<f32>>);

impl AudioLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new sample. Non-finite samples are stored as 0.
    pub fn set(&self, level: f32) {
        self.0.set(finite_or_zero(level));
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }
}

/// Mapping from user-facing knobs to shader values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTuning {
    /// Multiplier turning `audio_effect` into `u_audioReactivity`
    pub reactivity_scale: f32,
    /// Multiplier turning `audio_range` into `u_audioSensitivity`
    pub sensitivity_scale: f32,
    /// Upper clamp for `u_audioLevel`
    pub max_level: f32,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            reactivity_scale: 0.01,
            sensitivity_scale: 0.02,
            max_level: 1.0,
        }
    }
}

/// Reactivity and sensitivity knobs plus the shared level.
#[derive(Debug, Clone)]
pub struct AudioReactivity {
    level: AudioLevel,
    reactivity: f32,
    sensitivity: f32,
    tuning: AudioTuning,
}

impl AudioReactivity {
    /// # Arguments
    /// * `level` - Shared level slot written by the audio supplier
    /// * `audio_effect` - Reactivity strength (0 disables)
    /// * `audio_range` - Sensitivity to the level
    pub fn new(level: AudioLevel, audio_effect: f32, audio_range: f32, tuning: AudioTuning) -> Self {
        Self {
            level,
            reactivity: finite_or_zero(audio_effect),
            sensitivity: finite_or_zero(audio_range),
            tuning,
        }
    }

    pub fn set_reactivity(&mut self, audio_effect: f32) {
        self.reactivity = finite_or_zero(audio_effect);
    }

    pub fn set_sensitivity(&mut self, audio_range: f32) {
        self.sensitivity = finite_or_zero(audio_range);
    }

    pub fn set_tuning(&mut self, tuning: AudioTuning) {
        self.tuning = tuning;
    }

    pub fn level(&self) -> &AudioLevel {
        &self.level
    }

    /// Sensitivity after scaling, as written to `u_audioSensitivity`.
    pub fn scaled_sensitivity(&self) -> f32 {
        finite_or_zero(self.sensitivity * self.tuning.sensitivity_scale)
    }

    /// Reactivity after scaling, as written to `u_audioReactivity`.
    pub fn scaled_reactivity(&self) -> f32 {
        finite_or_zero(self.reactivity * self.tuning.reactivity_scale)
    }

    /// Level scaled by sensitivity and clamped to `[0, max_level]`.
    pub fn scaled_level(&self) -> f32 {
        let max = finite_or_zero(self.tuning.max_level).max(0.0);
        finite_or_zero(self.level.get() * self.scaled_sensitivity()).clamp(0.0, max)
    }

    pub fn write_uniforms(&self, gpu: &mut dyn UniformWriter, locations: &UniformLocations) {
        gpu.put_float(locations.audio_level, self.scaled_level());
        gpu.put_float(locations.audio_reactivity, self.scaled_reactivity());
        gpu.put_float(locations.audio_sensitivity, self.scaled_sensitivity());
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Audio effect. Registers a setter only; it takes no pointer input.
#[derive(Debug)]
pub struct AudioEffect {
    params: Rc<RefCell<AudioReactivity>>,
    state: EffectState,
}

impl AudioEffect {
    /// Registry id of the audio effect.
    pub const ID: &'static str = "audio";

    pub fn new(level: AudioLevel, audio_effect: f32, audio_range: f32, tuning: AudioTuning) -> Self {
        Self {
            params: Rc::new(RefCell::new(AudioReactivity::new(
                level,
                audio_effect,
                audio_range,
                tuning,
            ))),
            state: EffectState::Inactive,
        }
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == EffectState::Active
    }

    /// Handle the audio supplier writes samples into.
    pub fn level(&self) -> AudioLevel {
        self.params.borrow().level().clone()
    }

    pub fn params(&self) -> Rc<RefCell<AudioReactivity>> {
        Rc::clone(&self.params)
    }

    pub fn set_reactivity(&mut self, audio_effect: f32) {
        self.params.borrow_mut().set_reactivity(audio_effect);
    }

    pub fn set_sensitivity(&mut self, audio_range: f32) {
        self.params.borrow_mut().set_sensitivity(audio_range);
    }

    pub fn set_tuning(&mut self, tuning: AudioTuning) {
        self.params.borrow_mut().set_tuning(tuning);
    }

    pub fn set_enabled(&mut self, enabled: bool, hooks: &mut EffectHooks<'_>) -> bool {
        let params = Rc::clone(&self.params);
        transition(&mut self.state, enabled, Self::ID, hooks, move || {
            let setter: UniformSetter =
                Box::new(move |gpu, locations| params.borrow().write_uniforms(gpu, locations));
            (setter, None)
        })
    }
}
