//! The player: render core, frame loop, effects and input wired together.
//!
//! Hosts own the window/canvas and the media element. They hand the player a
//! [`GpuBackend`], a [`FrameScheduler`] and a [`Drawable`], then forward
//! frame callbacks, pointer events and key presses.

use std::rc::Rc;

use crate::ascii::GridDimensions;
use crate::clock::Clock;
use crate::config::AsciiOptions;
use crate::effects::{AudioEffect, AudioLevel, EffectHooks, MouseTrailEffect, RippleEffect};
use crate::frame_loop::{AsciiStats, FrameLoop, FrameScheduler, StatsCallback};
use crate::gpu::GpuBackend;
use crate::input::{handle_key, Key, KeyAction, PointerEvent, PointerHandlers};
use crate::media::{Drawable, MediaType};
use crate::render::{GlyphRasterizer, RenderCore, RenderError};

/// One ASCII rendering of one source.
pub struct AsciiPlayer<B: GpuBackend, S: FrameScheduler> {
    core: RenderCore<B>,
    frames: FrameLoop<S>,
    pointer: PointerHandlers,
    mouse: MouseTrailEffect,
    ripple: RippleEffect,
    audio: AudioEffect,
    source: Box<dyn Drawable>,
    media_type: MediaType,
    options: AsciiOptions,
    stats: Option<AsciiStats>,
    playing: bool,
}

impl<B: GpuBackend, S: FrameScheduler> AsciiPlayer<B, S> {
    /// Build the pipeline and attach the enabled effects.
    ///
    /// # Arguments
    /// * `backend` - GPU backend for the canvas
    /// * `scheduler` - Host frame-callback scheduler
    /// * `source` - Media to sample
    /// * `options` - Player options (validated here). `src` may be omitted
    ///   when `media_type` is set, since the `Drawable` carries the media
    ///   itself.
    /// * `rasterizer` - Glyph source for the atlas
    /// * `clock` - Time source for effect timestamps
    ///
    /// # Errors
    /// Configuration errors before any GPU work, including
    /// [`MissingSource`](crate::config::ConfigError::MissingSource) when
    /// neither `src` nor `media_type` is given; resource errors from the
    /// backend. Nothing is left allocated on failure.
    pub fn new(
        backend: B,
        scheduler: S,
        source: Box<dyn Drawable>,
        options: AsciiOptions,
        rasterizer: Box<dyn GlyphRasterizer>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, RenderError> {
        options.validate()?;
        let media_type = options.resolved_media_type()?;

        let core = RenderCore::new(backend, options.render_settings(), rasterizer)?;

        let mouse = MouseTrailEffect::new(options.trail_length, options.mouse_radius);
        let ripple = RippleEffect::new(options.ripple_speed, options.ripple_tuning, clock);
        let audio = AudioEffect::new(
            AudioLevel::new(),
            options.audio_effect,
            options.audio_range,
            options.audio_tuning,
        );

        let mut player = Self {
            core,
            frames: FrameLoop::new(scheduler),
            pointer: PointerHandlers::new(),
            mouse,
            ripple,
            audio,
            source,
            media_type,
            options,
            stats: None,
            playing: false,
        };
        player.apply_effects();

        // Images have nothing to start, so they render as soon as allowed.
        let start = player.options.is_playing
            && (player.options.auto_play || player.media_type == MediaType::Image);
        if start {
            player.play();
        } else {
            player.source.set_playing(false);
        }

        log::info!(
            "Player ready: {} source, charset of {} glyphs",
            player.media_type,
            player.core.atlas().glyph_count()
        );
        Ok(player)
    }

    fn apply_effects(&mut self) {
        let mut hooks = EffectHooks::new(self.core.registry_mut(), &mut self.pointer);
        self.mouse.set_enabled(self.options.enable_mouse, &mut hooks);
        self.ripple
            .set_enabled(self.options.enable_ripple, &mut hooks);
        self.audio
            .set_enabled(self.options.audio_effect > 0.0, &mut hooks);
    }

    /// Start the media and the frame loop.
    pub fn play(&mut self) {
        self.source.set_playing(true);
        self.frames.play();
        if !self.playing {
            log::info!("Playback started");
        }
        self.playing = true;
    }

    /// Stop the media and the frame loop. GPU resources stay alive.
    pub fn pause(&mut self) {
        self.source.set_playing(false);
        self.frames.pause();
        if self.playing {
            log::info!("Playback paused");
        }
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Handle a frame callback from the scheduler.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<AsciiStats> {
        let core = &mut self.core;
        let source: &dyn Drawable = &*self.source;
        let stats = self
            .frames
            .on_frame(timestamp_ms, |now| core.tick(source, now));
        if stats.is_some() {
            self.stats = stats;
        }
        stats
    }

    /// Route a pointer event to the active effects.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pointer.dispatch(&event);
    }

    /// Handle a key press. The host should suppress the default action when
    /// this returns [`KeyAction::TogglePlayback`].
    pub fn handle_key(&mut self, key: Key) -> KeyAction {
        let action = handle_key(key, self.options.enable_spacebar_toggle);
        if action == KeyAction::TogglePlayback {
            self.toggle();
        }
        action
    }

    /// Apply new options. Invalid options leave the player unchanged.
    pub fn set_options(&mut self, options: AsciiOptions) -> Result<(), RenderError> {
        options.validate()?;
        let media_type = options.resolved_media_type()?;

        if options.font_size != self.options.font_size {
            self.core.set_font_size(options.font_size)?;
        }
        self.core.set_charset(options.effective_charset())?;
        self.core.set_max_width(options.max_width)?;
        self.core.set_num_columns(options.num_columns)?;
        self.core.set_tone(options.tone())?;
        self.core.set_dither(options.dither);

        self.mouse.set_trail_length(options.trail_length);
        self.mouse.set_radius(options.mouse_radius);
        self.ripple.set_speed(options.ripple_speed);
        self.ripple.set_tuning(options.ripple_tuning);
        self.audio.set_reactivity(options.audio_effect);
        self.audio.set_sensitivity(options.audio_range);
        self.audio.set_tuning(options.audio_tuning);

        self.media_type = media_type;

        let was_playing = self.options.is_playing;
        self.options = options;
        self.apply_effects();

        if self.options.is_playing != was_playing {
            if self.options.is_playing {
                self.play();
            } else {
                self.pause();
            }
        }
        Ok(())
    }

    /// Swap in a new source, e.g. after the host loaded other media.
    pub fn set_source(&mut self, mut source: Box<dyn Drawable>, media_type: MediaType) {
        source.set_playing(self.playing);
        self.source = source;
        self.media_type = media_type;
        self.stats = None;
    }

    /// Install the stats callback.
    pub fn set_stats_callback(&mut self, callback: Option<StatsCallback>) {
        self.frames.set_stats_callback(callback);
    }

    /// True once the source size is known and the grid is drawable.
    pub fn is_ready(&self) -> bool {
        self.core.is_ready()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.core.dimensions()
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn options(&self) -> &AsciiOptions {
        &self.options
    }

    /// Latest stats, if any frame has been measured.
    pub fn stats(&self) -> Option<AsciiStats> {
        self.stats
    }

    /// `"{fps} FPS | {ms}ms"` when `show_stats` is on and a frame was measured.
    pub fn stats_label(&self) -> Option<String> {
        if !self.options.show_stats {
            return None;
        }
        self.stats.map(|s| s.label())
    }

    /// Handle the audio supplier writes level samples into.
    pub fn audio_level(&self) -> AudioLevel {
        self.audio.level()
    }

    pub fn mouse(&self) -> &MouseTrailEffect {
        &self.mouse
    }

    pub fn ripple(&self) -> &RippleEffect {
        &self.ripple
    }

    pub fn audio(&self) -> &AudioEffect {
        &self.audio
    }

    pub fn core(&self) -> &RenderCore<B> {
        &self.core
    }

    pub fn frame_loop(&self) -> &FrameLoop<S> {
        &self.frames
    }
}

impl<B: GpuBackend, S: FrameScheduler> Drop for AsciiPlayer<B, S> {
    fn drop(&mut self) {
        self.frames.teardown();
        self.source.set_playing(false);
        log::debug!("Player disposed after {} frames", self.core.frames_drawn());
    }
}

impl<B: GpuBackend, S: FrameScheduler> std::fmt::Debug for AsciiPlayer<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsciiPlayer")
            .field("media_type", &self.media_type)
            .field("playing", &self.playing)
            .field("core", &self.core)
            .field("frames", &self.frames)
            .field("pointer", &self.pointer)
            .finish()
    }
}
