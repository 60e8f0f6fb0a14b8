//! Cursor trail effect.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{transition, unit_or, EffectHooks, EffectState};
use crate::gpu::UniformWriter;
use crate::input::{PointerEvent, PointerHandler};
use crate::render::{UniformLocations, UniformSetter, TRAIL_SENTINEL};

/// Capacity of the `u_trail` uniform array.
pub const MAX_TRAIL_LENGTH: usize = 24;

/// Default number of remembered cursor positions.
pub const DEFAULT_TRAIL_LENGTH: u32 = 20;

/// Default highlight radius in normalized canvas units.
pub const DEFAULT_MOUSE_RADIUS: f32 = 0.08;

/// Ring buffer of recent cursor positions plus the live cursor.
///
/// A trail of length 0 is switched off: it tracks nothing and writes the
/// sentinel cursor with a zero radius.
#[derive(Debug, Clone)]
pub struct MouseTrail {
    positions: VecDeque<[f32; 2]>,
    capacity: usize,
    cursor: Option<[f32; 2]>,
    radius: f32,
    dirty: bool,
    packed: Vec<[f32; 2]>,
}

impl MouseTrail {
    /// Create a trail remembering `trail_length` positions (clamped to
    /// [`MAX_TRAIL_LENGTH`]).
    pub fn new(trail_length: u32, radius: f32) -> Self {
        let capacity = clamp_length(trail_length);
        Self {
            positions: VecDeque::with_capacity(capacity),
            capacity,
            cursor: None,
            radius: sanitize_radius(radius),
            dirty: true,
            packed: vec![TRAIL_SENTINEL; MAX_TRAIL_LENGTH],
        }
    }

    /// Change the capacity. Reallocates and clears the buffer.
    pub fn set_capacity(&mut self, trail_length: u32) {
        let capacity = clamp_length(trail_length);
        if capacity == self.capacity {
            return;
        }
        self.capacity = capacity;
        self.positions = VecDeque::with_capacity(capacity);
        if capacity == 0 {
            self.cursor = None;
        }
        self.dirty = true;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = sanitize_radius(radius);
    }

    /// Record a cursor move, evicting the oldest position when full.
    pub fn push(&mut self, x: f32, y: f32) {
        if self.capacity == 0 || !x.is_finite() || !y.is_finite() {
            return;
        }
        let point = [unit_or(x, 0.0), unit_or(y, 0.0)];
        self.cursor = Some(point);
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(point);
        self.dirty = true;
    }

    /// Forget the cursor and every trail position.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.cursor = None;
        self.dirty = true;
    }

    /// Positions in chronological order (oldest first).
    pub fn positions(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.positions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> Option<[f32; 2]> {
        self.cursor
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// True when positions changed since the last uniform write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write `u_mouse`, `u_mouseRadius`, `u_trailLength` and every `u_trail`
    /// slot, sentinel-padded.
    pub fn write_uniforms(&mut self, gpu: &mut dyn UniformWriter, locations: &UniformLocations) {
        if self.dirty {
            self.packed.fill(TRAIL_SENTINEL);
            for (slot, point) in self.packed.iter_mut().zip(self.positions.iter()) {
                *slot = *point;
            }
            self.dirty = false;
        }

        let radius = if self.capacity == 0 { 0.0 } else { self.radius };
        gpu.put_vec2(locations.mouse, self.cursor.unwrap_or(TRAIL_SENTINEL));
        gpu.put_float(locations.mouse_radius, radius);
        gpu.put_int(locations.trail_length, self.positions.len() as i32);
        for (location, point) in locations.trail.iter().zip(self.packed.iter()) {
            gpu.put_vec2(*location, *point);
        }
    }
}

fn clamp_length(trail_length: u32) -> usize {
    let length = trail_length as usize;
    if length > MAX_TRAIL_LENGTH {
        log::warn!(
            "trail length {} exceeds maximum {}, clamping",
            length,
            MAX_TRAIL_LENGTH
        );
    }
    length.min(MAX_TRAIL_LENGTH)
}

fn sanitize_radius(radius: f32) -> f32 {
    if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        0.0
    }
}

/// Mouse trail effect: pointer moves feed the trail, leaving clears it.
#[derive(Debug)]
pub struct MouseTrailEffect {
    trail: Rc<RefCell<MouseTrail>>,
    state: EffectState,
}

impl MouseTrailEffect {
    /// Registry id of the mouse effect.
    pub const ID: &'static str = "mouse";

    pub fn new(trail_length: u32, radius: f32) -> Self {
        Self {
            trail: Rc::new(RefCell::new(MouseTrail::new(trail_length, radius))),
            state: EffectState::Inactive,
        }
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == EffectState::Active
    }

    /// Shared handle to the trail state.
    pub fn trail(&self) -> Rc<RefCell<MouseTrail>> {
        Rc::clone(&self.trail)
    }

    pub fn set_trail_length(&mut self, trail_length: u32) {
        self.trail.borrow_mut().set_capacity(trail_length);
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.trail.borrow_mut().set_radius(radius);
    }

    /// Enter Active (register + attach) or Inactive (unregister + detach).
    pub fn set_enabled(&mut self, enabled: bool, hooks: &mut EffectHooks<'_>) -> bool {
        let trail = Rc::clone(&self.trail);
        let changed = transition(&mut self.state, enabled, Self::ID, hooks, move || {
            let for_setter = Rc::clone(&trail);
            let setter: UniformSetter = Box::new(move |gpu, locations| {
                for_setter.borrow_mut().write_uniforms(gpu, locations)
            });
            let handler: PointerHandler = Box::new(move |event| match *event {
                PointerEvent::Move { x, y } => trail.borrow_mut().push(x, y),
                PointerEvent::Leave => trail.borrow_mut().clear(),
                PointerEvent::Click { .. } => {}
            });
            (setter, Some(handler))
        });
        if changed && !enabled {
            self.trail.borrow_mut().clear();
        }
        changed
    }
}
