//! Uniform setter registry.
//!
//! Effects contribute shader state by registering a setter under their id.
//! The render core invokes every setter once per frame, in registration
//! order, right before the draw call. It never needs to know which effects
//! exist.

use indexmap::IndexMap;

use crate::gpu::UniformWriter;
use crate::render::UniformLocations;

/// Callback that writes zero or more uniform values for one frame.
pub type UniformSetter = Box<dyn FnMut(&mut dyn UniformWriter, &UniformLocations)>;

/// Ordered map from effect id to its uniform setter.
#[derive(Default)]
pub struct UniformSetterRegistry {
    setters: IndexMap<String, UniformSetter>,
    generation: u64,
}

impl UniformSetterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `setter` under `id`.
    ///
    /// An existing entry with the same id is replaced in place, keeping its
    /// position in the invocation order.
    pub fn register(&mut self, id: impl Into<String>, setter: UniformSetter) {
        let id = id.into();
        log::debug!("Registering uniform setter '{}'", id);
        self.setters.insert(id, setter);
        self.generation += 1;
    }

    /// Remove the setter under `id`. Returns false (and does nothing) when
    /// no such setter exists.
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.setters.shift_remove(id).is_none() {
            return false;
        }
        log::debug!("Unregistered uniform setter '{}'", id);
        self.generation += 1;
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.setters.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// Registered ids in invocation order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    /// Changes every time the set of setters changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run every setter, in registration order.
    pub fn apply(&mut self, gpu: &mut dyn UniformWriter, locations: &UniformLocations) {
        for setter in self.setters.values_mut() {
            setter(gpu, locations);
        }
    }
}

impl std::fmt::Debug for UniformSetterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformSetterRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::UniformLocation;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Writer that ignores everything.
    struct NullWriter;

    impl UniformWriter for NullWriter {
        fn set_int(&mut self, _: UniformLocation, _: i32) {}
        fn set_float(&mut self, _: UniformLocation, _: f32) {}
        fn set_vec2(&mut self, _: UniformLocation, _: [f32; 2]) {}
        fn set_vec3(&mut self, _: UniformLocation, _: [f32; 3]) {}
    }

    fn tracing_setter(trace: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> UniformSetter {
        let trace = Rc::clone(trace);
        Box::new(move |_, _| trace.borrow_mut().push(tag))
    }

    #[test]
    fn test_register_replace_unregister_leaves_empty() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = UniformSetterRegistry::new();
        registry.register("a", tracing_setter(&trace, "f"));
        registry.register("a", tracing_setter(&trace, "g"));
        assert_eq!(registry.len(), 1);

        registry.apply(&mut NullWriter, &UniformLocations::empty());
        assert_eq!(*trace.borrow(), vec!["g"]);

        assert!(registry.unregister("a"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_missing_is_no_op() {
        let mut registry = UniformSetterRegistry::new();
        let generation = registry.generation();
        assert!(!registry.unregister("missing"));
        assert_eq!(registry.generation(), generation);
    }

    #[test]
    fn test_apply_runs_in_registration_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = UniformSetterRegistry::new();
        registry.register("mouse", tracing_setter(&trace, "mouse"));
        registry.register("ripple", tracing_setter(&trace, "ripple"));
        registry.register("audio", tracing_setter(&trace, "audio"));
        // Replacing keeps the original slot.
        registry.register("mouse", tracing_setter(&trace, "mouse2"));

        registry.apply(&mut NullWriter, &UniformLocations::empty());
        assert_eq!(*trace.borrow(), vec!["mouse2", "ripple", "audio"]);
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["mouse", "ripple", "audio"]
        );
    }

    #[test]
    fn test_unregister_preserves_remaining_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = UniformSetterRegistry::new();
        registry.register("a", tracing_setter(&trace, "a"));
        registry.register("b", tracing_setter(&trace, "b"));
        registry.register("c", tracing_setter(&trace, "c"));
        registry.unregister("a");

        registry.apply(&mut NullWriter, &UniformLocations::empty());
        assert_eq!(*trace.borrow(), vec!["b", "c"]);
    }

    #[test]
    fn test_generation_tracks_changes() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = UniformSetterRegistry::new();
        let g0 = registry.generation();
        registry.register("a", tracing_setter(&trace, "a"));
        let g1 = registry.generation();
        registry.unregister("a");
        assert!(g1 > g0);
        assert!(registry.generation() > g1);
    }
}
