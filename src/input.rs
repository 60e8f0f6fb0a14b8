//! Pointer and keyboard input routing.
//!
//! This module handles:
//! - Normalizing host pointer events into canvas-relative coordinates
//! - Dispatching pointer events to the handlers attached by active effects
//! - The spacebar playback toggle

use indexmap::IndexMap;

/// Pointer event in normalized canvas coordinates (`0.0..=1.0`, origin at
/// the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Leave,
    Click { x: f32, y: f32 },
}

impl PointerEvent {
    /// Build a move event from pixel coordinates relative to the canvas.
    pub fn move_at(px: f32, py: f32, width: f32, height: f32) -> Self {
        let (x, y) = normalize(px, py, width, height);
        PointerEvent::Move { x, y }
    }

    /// Build a click event from pixel coordinates relative to the canvas.
    pub fn click_at(px: f32, py: f32, width: f32, height: f32) -> Self {
        let (x, y) = normalize(px, py, width, height);
        PointerEvent::Click { x, y }
    }
}

fn normalize(px: f32, py: f32, width: f32, height: f32) -> (f32, f32) {
    if !(width > 0.0) || !(height > 0.0) {
        return (0.0, 0.0);
    }
    ((px / width).clamp(0.0, 1.0), (py / height).clamp(0.0, 1.0))
}

/// Handler attached by an effect while it is active.
pub type PointerHandler = Box<dyn FnMut(&PointerEvent)>;

/// Pointer handlers keyed by effect id.
///
/// Mirrors the uniform setter registry: attaching under an existing id
/// replaces that handler, detaching a missing id is a no-op.
#[derive(Default)]
pub struct PointerHandlers {
    handlers: IndexMap<String, PointerHandler>,
}

impl PointerHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: impl Into<String>, handler: PointerHandler) {
        self.handlers.insert(id.into(), handler);
    }

    pub fn detach(&mut self, id: &str) -> bool {
        self.handlers.shift_remove(id).is_some()
    }

    pub fn is_attached(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `event` to every attached handler.
    pub fn dispatch(&mut self, event: &PointerEvent) {
        for handler in self.handlers.values_mut() {
            handler(event);
        }
    }
}

impl std::fmt::Debug for PointerHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.handlers.keys()).finish()
    }
}

/// Keys the player reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    Other,
}

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Playback should toggle; the host should suppress the default action
    TogglePlayback,
    /// Key is not ours
    None,
}

/// Map a key press to an action.
///
/// Only the spacebar is intercepted, and only when the toggle is enabled.
pub fn handle_key(key: Key, enable_spacebar_toggle: bool) -> KeyAction {
    match key {
        Key::Space | Key::Char(' ') if enable_spacebar_toggle => KeyAction::TogglePlayback,
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_normalize_pixels() {
        assert_eq!(
            PointerEvent::move_at(300.0, 85.0, 600.0, 340.0),
            PointerEvent::Move { x: 0.5, y: 0.25 }
        );
    }

    #[test]
    fn test_normalize_clamps_outside_canvas() {
        assert_eq!(
            PointerEvent::click_at(-10.0, 1000.0, 600.0, 340.0),
            PointerEvent::Click { x: 0.0, y: 1.0 }
        );
    }

    #[test]
    fn test_normalize_zero_canvas() {
        assert_eq!(
            PointerEvent::move_at(5.0, 5.0, 0.0, 0.0),
            PointerEvent::Move { x: 0.0, y: 0.0 }
        );
    }

    #[test]
    fn test_dispatch_reaches_attached_handlers_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = PointerHandlers::new();

        let sink = Rc::clone(&seen);
        handlers.attach("mouse", Box::new(move |e| sink.borrow_mut().push(*e)));
        handlers.dispatch(&PointerEvent::Leave);
        assert!(handlers.detach("mouse"));
        handlers.dispatch(&PointerEvent::Leave);

        assert_eq!(seen.borrow().len(), 1);
        assert!(!handlers.detach("mouse"));
    }

    #[test]
    fn test_spacebar_toggle() {
        assert_eq!(handle_key(Key::Space, true), KeyAction::TogglePlayback);
        assert_eq!(handle_key(Key::Char(' '), true), KeyAction::TogglePlayback);
        assert_eq!(handle_key(Key::Space, false), KeyAction::None);
        assert_eq!(handle_key(Key::Char('p'), true), KeyAction::None);
    }
}
