//! Cached uniform locations.
//!
//! Every uniform the pipeline uses is resolved once, right after the program
//! links. The table is read-only afterwards; an entry is either a live handle
//! or `None` when the driver optimized the uniform out.

use crate::effects::{MAX_RIPPLES, MAX_TRAIL_LENGTH};
use crate::gpu::{GpuBackend, ProgramId, UniformLocation, UniformWriter};

/// Trail slot value meaning "no position".
pub const TRAIL_SENTINEL: [f32; 2] = [-1.0, -1.0];

/// Ripple slot value meaning "no ripple" (negative start time).
pub const RIPPLE_SENTINEL: [f32; 3] = [0.0, 0.0, -1.0];

/// Resolved uniform handles of the ASCII program.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLocations {
    // Core
    pub video: Option<UniformLocation>,
    pub ascii_atlas: Option<UniformLocation>,
    pub resolution: Option<UniformLocation>,
    pub char_size: Option<UniformLocation>,
    pub grid_size: Option<UniformLocation>,
    pub num_chars: Option<UniformLocation>,
    pub colored: Option<UniformLocation>,
    pub blend: Option<UniformLocation>,
    pub highlight: Option<UniformLocation>,
    pub brightness: Option<UniformLocation>,
    pub dither_mode: Option<UniformLocation>,

    // Mouse
    pub mouse: Option<UniformLocation>,
    pub mouse_radius: Option<UniformLocation>,
    pub trail_length: Option<UniformLocation>,
    pub trail: Vec<Option<UniformLocation>>,

    // Ripple
    pub time: Option<UniformLocation>,
    pub ripple_enabled: Option<UniformLocation>,
    pub ripple_speed: Option<UniformLocation>,
    pub ripples: Vec<Option<UniformLocation>>,

    // Audio
    pub audio_level: Option<UniformLocation>,
    pub audio_reactivity: Option<UniformLocation>,
    pub audio_sensitivity: Option<UniformLocation>,
}

impl UniformLocations {
    /// Resolve every uniform of `program`.
    pub fn resolve<B: GpuBackend + ?Sized>(gpu: &mut B, program: ProgramId) -> Self {
        let mut get = |name: &str| gpu.uniform_location(program, name);

        let video = get("u_video");
        let ascii_atlas = get("u_asciiAtlas");
        let resolution = get("u_resolution");
        let char_size = get("u_charSize");
        let grid_size = get("u_gridSize");
        let num_chars = get("u_numChars");
        let colored = get("u_colored");
        let blend = get("u_blend");
        let highlight = get("u_highlight");
        let brightness = get("u_brightness");
        let dither_mode = get("u_ditherMode");

        let mouse = get("u_mouse");
        let mouse_radius = get("u_mouseRadius");
        let trail_length = get("u_trailLength");
        let trail = (0..MAX_TRAIL_LENGTH)
            .map(|i| get(&format!("u_trail[{}]", i)))
            .collect();

        let time = get("u_time");
        let ripple_enabled = get("u_rippleEnabled");
        let ripple_speed = get("u_rippleSpeed");
        let ripples = (0..MAX_RIPPLES)
            .map(|i| get(&format!("u_ripples[{}]", i)))
            .collect();

        let audio_level = get("u_audioLevel");
        let audio_reactivity = get("u_audioReactivity");
        let audio_sensitivity = get("u_audioSensitivity");

        Self {
            video,
            ascii_atlas,
            resolution,
            char_size,
            grid_size,
            num_chars,
            colored,
            blend,
            highlight,
            brightness,
            dither_mode,
            mouse,
            mouse_radius,
            trail_length,
            trail,
            time,
            ripple_enabled,
            ripple_speed,
            ripples,
            audio_level,
            audio_reactivity,
            audio_sensitivity,
        }
    }

    /// A table with every entry absent.
    pub fn empty() -> Self {
        Self {
            video: None,
            ascii_atlas: None,
            resolution: None,
            char_size: None,
            grid_size: None,
            num_chars: None,
            colored: None,
            blend: None,
            highlight: None,
            brightness: None,
            dither_mode: None,
            mouse: None,
            mouse_radius: None,
            trail_length: None,
            trail: vec![None; MAX_TRAIL_LENGTH],
            time: None,
            ripple_enabled: None,
            ripple_speed: None,
            ripples: vec![None; MAX_RIPPLES],
            audio_level: None,
            audio_reactivity: None,
            audio_sensitivity: None,
        }
    }
}

/// Write neutral values to every effect uniform.
///
/// Used when the set of registered setters changes, so a detached effect
/// does not leave its last values behind in the program.
pub fn write_effect_defaults(gpu: &mut dyn UniformWriter, locations: &UniformLocations) {
    gpu.put_vec2(locations.mouse, TRAIL_SENTINEL);
    gpu.put_float(locations.mouse_radius, 0.0);
    gpu.put_int(locations.trail_length, 0);
    for slot in &locations.trail {
        gpu.put_vec2(*slot, TRAIL_SENTINEL);
    }

    gpu.put_int(locations.ripple_enabled, 0);
    gpu.put_float(locations.ripple_speed, 0.0);
    for slot in &locations.ripples {
        gpu.put_vec3(*slot, RIPPLE_SENTINEL);
    }

    gpu.put_float(locations.audio_level, 0.0);
    gpu.put_float(locations.audio_reactivity, 0.0);
    gpu.put_float(locations.audio_sensitivity, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{HeadlessBackend, UniformValue};

    #[test]
    fn test_resolve_marks_undeclared_uniforms_absent() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu
            .create_program("", "uniform float u_blend; uniform vec2 u_trail[24];")
            .unwrap();
        let locations = UniformLocations::resolve(&mut gpu, program);
        assert!(locations.blend.is_some());
        assert!(locations.video.is_none());
        assert_eq!(locations.trail.len(), MAX_TRAIL_LENGTH);
        assert!(locations.trail.iter().all(Option::is_some));
        assert!(locations.ripples.iter().all(Option::is_none));
    }

    #[test]
    fn test_effect_defaults_are_neutral() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu
            .create_program(
                "",
                "uniform int u_rippleEnabled; uniform vec2 u_trail[24]; uniform float u_audioLevel;",
            )
            .unwrap();
        let locations = UniformLocations::resolve(&mut gpu, program);
        write_effect_defaults(&mut gpu, &locations);
        assert_eq!(gpu.uniform("u_rippleEnabled"), Some(UniformValue::Int(0)));
        assert_eq!(
            gpu.uniform("u_trail[0]"),
            Some(UniformValue::Vec2(TRAIL_SENTINEL))
        );
        assert_eq!(gpu.uniform("u_audioLevel"), Some(UniformValue::Float(0.0)));
    }
}
