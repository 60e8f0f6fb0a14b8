//! Integration tests for the render core against the headless backend.
//!
//! These tests verify:
//! - Grid and canvas uniforms for a real-sized source
//! - Dither, font size and tone changes reach the shader
//! - Configuration errors surface before any GPU work
//! - Uniform locations are resolved once
//! - Uniform setters run in order, before the draw
//! - GPU resources are released on drop and on failed initialization

use std::cell::RefCell;
use std::rc::Rc;

use video2ascii::ascii::{DitherMode, BLOCKS_CHARSET, STANDARD_CHARSET};
use video2ascii::config::ConfigError;
use video2ascii::gpu::{GpuCommand, HeadlessBackend, ResourceInitError, ShaderStage, UniformValue};
use video2ascii::media::StillImage;
use video2ascii::render::{
    GlyphRasterizer, RenderCore, RenderError, RenderSettings, TickOutcome, Tone,
};

/// Fills every non-blank glyph cell completely.
struct SolidRasterizer;

impl GlyphRasterizer for SolidRasterizer {
    fn rasterize(&self, glyph: char, width: u32, height: u32) -> Vec<u8> {
        let value = if glyph == ' ' { 0 } else { 255 };
        vec![value; (width * height) as usize]
    }
}

fn frame(width: u32, height: u32) -> StillImage {
    StillImage::new(width, height, vec![128; (width * height * 4) as usize])
}

fn core_with(settings: RenderSettings) -> RenderCore<HeadlessBackend> {
    RenderCore::new(HeadlessBackend::new(), settings, Box::new(SolidRasterizer)).unwrap()
}

fn columns(n: u32) -> RenderSettings {
    RenderSettings {
        num_columns: Some(n),
        ..RenderSettings::default()
    }
}

fn vec2(core: &RenderCore<HeadlessBackend>, name: &str) -> [f32; 2] {
    match core.backend().uniform(name) {
        Some(UniformValue::Vec2(v)) => v,
        other => panic!("{} is not a vec2: {:?}", name, other),
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ==================== Grid Tests ====================

#[test]
fn test_hd_source_at_100_columns() {
    let mut core = core_with(columns(100));
    let source = frame(1920, 1080);

    assert_eq!(core.tick(&source, 0.0), TickOutcome::Drawn);

    let grid = core.dimensions();
    assert_eq!((grid.cols, grid.rows), (100, 34));
    assert_eq!(
        core.backend().uniform("u_gridSize"),
        Some(UniformValue::Vec2([100.0, 34.0]))
    );
    assert_eq!(
        core.backend().uniform("u_resolution"),
        Some(UniformValue::Vec2([600.0, 340.0]))
    );
    assert_eq!(
        core.backend().uniform("u_numChars"),
        Some(UniformValue::Float(STANDARD_CHARSET.chars().count() as f32))
    );
    assert_eq!(core.backend().uniform("u_colored"), Some(UniformValue::Int(1)));
}

#[test]
fn test_grid_follows_source_resize() {
    let mut core = core_with(columns(80));
    core.tick(&frame(640, 480), 0.0);
    assert_eq!(core.dimensions().rows, 36);

    core.tick(&frame(480, 640), 16.0);
    assert_eq!(core.dimensions().rows, 64);
}

#[test]
fn test_no_frame_skips_without_gpu_work() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut core = RenderCore::new(backend, columns(100), Box::new(SolidRasterizer)).unwrap();
    log.clear();

    let broken = StillImage::new(4, 4, vec![0; 3]);
    assert_eq!(core.tick(&broken, 0.0), TickOutcome::Skipped);
    assert!(log.commands().is_empty());
    assert!(!core.is_ready());
}

// ==================== Shader Parameter Tests ====================

#[test]
fn test_dither_mode_reaches_shader() {
    let mut core = core_with(columns(40));
    let source = frame(320, 240);

    core.tick(&source, 0.0);
    assert_eq!(core.backend().uniform("u_ditherMode"), Some(UniformValue::Int(0)));

    core.set_dither(DitherMode::Bayer);
    core.tick(&source, 16.0);
    assert_eq!(core.backend().uniform("u_ditherMode"), Some(UniformValue::Int(1)));

    core.set_dither(DitherMode::Random);
    core.tick(&source, 32.0);
    assert_eq!(core.backend().uniform("u_ditherMode"), Some(UniformValue::Int(2)));
}

#[test]
fn test_font_size_rebuilds_atlas_and_canvas() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut core = RenderCore::new(backend, columns(100), Box::new(SolidRasterizer)).unwrap();
    let source = frame(1920, 1080);
    core.tick(&source, 0.0);
    assert_eq!(vec2(&core, "u_resolution"), [600.0, 340.0]);
    log.clear();

    core.set_font_size(20.0).unwrap();
    core.tick(&source, 16.0);

    let glyphs = STANDARD_CHARSET.chars().count() as u32;
    assert_eq!(core.atlas().height(), 20);
    assert_eq!(core.atlas().width(), 12 * glyphs);
    assert!(log.commands().iter().any(|c| matches!(
        c,
        GpuCommand::UploadTexture { width, height: 20, .. } if *width == 12 * glyphs
    )));

    let [cell_width, cell_height] = vec2(&core, "u_charSize");
    assert!(approx(cell_width, 12.0));
    assert_eq!(cell_height, 20.0);
    assert_eq!(vec2(&core, "u_resolution"), [1200.0, 680.0]);
    assert_eq!(vec2(&core, "u_gridSize"), [100.0, 34.0]);
}

#[test]
fn test_tone_reaches_shader() {
    let mut core = core_with(columns(40));
    let source = frame(320, 240);
    core.set_tone(Tone {
        colored: false,
        blend: 0.4,
        highlight: 0.2,
        brightness: 1.5,
    })
    .unwrap();
    core.tick(&source, 0.0);

    assert_eq!(core.backend().uniform("u_colored"), Some(UniformValue::Int(0)));
    assert_eq!(core.backend().uniform("u_blend"), Some(UniformValue::Float(0.4)));
    assert_eq!(core.backend().uniform("u_highlight"), Some(UniformValue::Float(0.2)));
    assert_eq!(core.backend().uniform("u_brightness"), Some(UniformValue::Float(1.5)));

    assert!(core
        .set_tone(Tone {
            brightness: 9.0,
            ..Tone::default()
        })
        .is_err());
    core.tick(&source, 16.0);
    assert_eq!(core.backend().uniform("u_brightness"), Some(UniformValue::Float(1.5)));
}

// ==================== Configuration Error Tests ====================

#[test]
fn test_empty_charset_fails_before_gpu_work() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let settings = RenderSettings {
        charset: String::new(),
        ..RenderSettings::default()
    };

    let result = RenderCore::new(backend, settings, Box::new(SolidRasterizer));

    assert!(matches!(
        result,
        Err(RenderError::Config(ConfigError::EmptyCharset))
    ));
    assert!(log.commands().is_empty());
    assert_eq!(log.draw_count(), 0);
}

#[test]
fn test_atlas_past_texture_limit_fails_before_gpu_work() {
    let backend = HeadlessBackend::with_max_texture_size(256);
    let log = backend.log();
    // 50 glyphs of 6 px cells need a 300 px strip.
    let settings = RenderSettings {
        charset: "x".repeat(50),
        ..columns(10)
    };

    let result = RenderCore::new(backend, settings, Box::new(SolidRasterizer));

    assert!(matches!(
        result,
        Err(RenderError::Config(ConfigError::AtlasTooLarge {
            glyphs: 50,
            max_width: 256,
            ..
        }))
    ));
    assert!(log.commands().is_empty());
}

#[test]
fn test_font_size_past_texture_limit_keeps_atlas() {
    let backend = HeadlessBackend::with_max_texture_size(256);
    let mut core = RenderCore::new(backend, columns(10), Box::new(SolidRasterizer)).unwrap();

    assert!(matches!(
        core.set_font_size(50.0),
        Err(ConfigError::AtlasTooLarge { .. })
    ));
    assert_eq!(core.settings().font_size, 10.0);
    assert_eq!(core.atlas().height(), 10);
}

#[test]
fn test_set_charset_rejects_empty_and_keeps_atlas() {
    let mut core = core_with(columns(10));
    assert!(matches!(
        core.set_charset(""),
        Err(ConfigError::EmptyCharset)
    ));
    assert_eq!(core.settings().charset, STANDARD_CHARSET);
    assert_eq!(core.atlas().glyph_count(), 10);
}

#[test]
fn test_set_charset_swaps_atlas() {
    let mut core = core_with(columns(10));
    core.set_charset(BLOCKS_CHARSET).unwrap();
    core.tick(&frame(100, 100), 0.0);
    assert_eq!(
        core.backend().uniform("u_numChars"),
        Some(UniformValue::Float(5.0))
    );
}

// ==================== Uniform Location Tests ====================

#[test]
fn test_locations_resolved_once() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut core = RenderCore::new(backend, columns(40), Box::new(SolidRasterizer)).unwrap();
    let resolved = log.resolved_uniforms();
    let before = core.locations().clone();

    let source = frame(320, 240);
    for i in 0..5 {
        core.tick(&source, i as f64 * 16.0);
    }

    assert_eq!(log.resolved_uniforms(), resolved);
    assert_eq!(core.locations(), &before);
    assert_eq!(log.draw_count(), 5);
}

// ==================== Setter Registry Tests ====================

#[test]
fn test_setters_run_in_order_before_draw() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut core = RenderCore::new(backend, columns(40), Box::new(SolidRasterizer)).unwrap();

    let order = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::clone(&order);
    core.registry_mut().register(
        "first",
        Box::new(move |gpu, loc| {
            first.borrow_mut().push("first");
            gpu.put_float(loc.highlight, 0.25);
        }),
    );
    let second = Rc::clone(&order);
    core.registry_mut().register(
        "second",
        Box::new(move |gpu, loc| {
            second.borrow_mut().push("second");
            gpu.put_float(loc.highlight, 0.75);
        }),
    );

    core.tick(&frame(320, 240), 0.0);

    assert_eq!(*order.borrow(), vec!["first", "second"]);
    assert_eq!(log.writes_to("u_highlight").last(), Some(&UniformValue::Float(0.75)));

    let commands = log.commands();
    let draw = commands
        .iter()
        .position(|c| matches!(c, GpuCommand::Draw { .. }))
        .unwrap();
    let last_highlight = commands
        .iter()
        .rposition(|c| matches!(c, GpuCommand::SetUniform { name, .. } if name == "u_highlight"))
        .unwrap();
    assert!(last_highlight < draw);
}

#[test]
fn test_unregistered_setter_values_reset() {
    let mut core = core_with(columns(40));
    let source = frame(320, 240);
    core.registry_mut().register(
        "ripple-like",
        Box::new(|gpu, loc| gpu.put_int(loc.ripple_enabled, 1)),
    );
    core.tick(&source, 0.0);
    assert_eq!(
        core.backend().uniform("u_rippleEnabled"),
        Some(UniformValue::Int(1))
    );

    assert!(core.registry_mut().unregister("ripple-like"));
    core.tick(&source, 16.0);
    assert_eq!(
        core.backend().uniform("u_rippleEnabled"),
        Some(UniformValue::Int(0))
    );
}

// ==================== Resource Lifetime Tests ====================

#[test]
fn test_drop_releases_gpu_resources() {
    let backend = HeadlessBackend::new();
    let log = backend.log();
    let mut core = RenderCore::new(backend, columns(40), Box::new(SolidRasterizer)).unwrap();
    core.tick(&frame(64, 64), 0.0);
    assert_eq!(log.live_textures().len(), 2);
    assert_eq!(log.live_programs().len(), 1);

    drop(core);

    assert!(log.live_textures().is_empty());
    assert!(log.live_programs().is_empty());
}

#[test]
fn test_failed_texture_allocation_releases_program() {
    let backend = HeadlessBackend::with_texture_budget(1);
    let log = backend.log();

    let result = RenderCore::new(backend, columns(40), Box::new(SolidRasterizer));

    assert!(matches!(
        result,
        Err(RenderError::ResourceInit(ResourceInitError::Allocation { .. }))
    ));
    assert!(log.live_textures().is_empty());
    assert!(log.live_programs().is_empty());
}

#[test]
fn test_shader_compile_failure_is_reported() {
    let backend = HeadlessBackend::failing_compile(ShaderStage::Fragment);
    let log = backend.log();

    let result = RenderCore::new(backend, columns(40), Box::new(SolidRasterizer));

    match result {
        Err(RenderError::ResourceInit(ResourceInitError::ShaderCompile { stage, .. })) => {
            assert_eq!(stage, ShaderStage::Fragment)
        }
        other => panic!("Expected shader compile error, got {:?}", other.err()),
    }
    assert_eq!(log.draw_count(), 0);
    assert!(log.live_textures().is_empty());
}
