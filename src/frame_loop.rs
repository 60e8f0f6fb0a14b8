//! Frame loop driver.
//!
//! Ticks come from the host's frame-callback scheduler (an animation frame
//! in a browser, a vsync callback on desktop). The driver keeps at most one
//! request outstanding, measures the time between callbacks and reports
//! [`AsciiStats`] for frames that were actually drawn.
//!
//! ```text
//!          start/play                pause
//!  Idle ─────────────► Running ◄──────────► Paused
//!                         │        play
//!                         │ teardown (from any state)
//!                         ▼
//!                      TornDown
//! ```

use crate::render::TickOutcome;

/// Identifies one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's frame-callback mechanism.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler for hosts that poll: requests are only recorded, and the host
/// calls [`FrameLoop::on_frame`] itself when [`ManualScheduler::pending`]
/// is set.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    requests: u64,
    cancels: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request waiting to fire, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Total requests made.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Total cancellations made.
    pub fn cancels(&self) -> u64 {
        self.cancels
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requests += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancels += 1;
    }
}

/// Frame timing reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AsciiStats {
    /// Frames per second implied by the last frame interval
    pub fps: f64,
    /// Last frame interval in milliseconds
    pub frame_time: f64,
}

impl AsciiStats {
    /// Stats for a frame that followed the previous one by `delta_ms`.
    ///
    /// # Returns
    /// `None` for a zero, negative or non-finite delta.
    pub fn from_delta(delta_ms: f64) -> Option<Self> {
        if !(delta_ms.is_finite() && delta_ms > 0.0) {
            return None;
        }
        Some(Self {
            fps: 1000.0 / delta_ms,
            frame_time: delta_ms,
        })
    }

    /// `"60 FPS | 16.7ms"`
    pub fn label(&self) -> String {
        format!("{:.0} FPS | {:.1}ms", self.fps, self.frame_time)
    }
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Paused,
    TornDown,
}

/// Callback receiving stats for each drawn frame.
pub type StatsCallback = Box<dyn FnMut(&AsciiStats)>;

/// Drives ticks from a [`FrameScheduler`].
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState,
    pending: Option<FrameHandle>,
    last_timestamp: Option<f64>,
    ticks: u64,
    on_stats: Option<StatsCallback>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            pending: None,
            last_timestamp: None,
            ticks: 0,
            on_stats: None,
        }
    }

    /// Install the stats callback (called at most once per drawn frame).
    pub fn set_stats_callback(&mut self, callback: Option<StatsCallback>) {
        self.on_stats = callback;
    }

    /// Begin ticking. Same as [`FrameLoop::play`].
    pub fn start(&mut self) {
        self.play();
    }

    /// Resume (or begin) ticking. No-op when running or torn down.
    pub fn play(&mut self) {
        match self.state {
            LoopState::Idle | LoopState::Paused => {
                self.state = LoopState::Running;
                self.last_timestamp = None;
                self.request();
            }
            LoopState::Running | LoopState::TornDown => {}
        }
    }

    /// Stop ticking and withdraw the outstanding request.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.cancel();
            self.state = LoopState::Paused;
        }
    }

    /// Stop for good. No further requests are ever made.
    pub fn teardown(&mut self) {
        if self.state != LoopState::TornDown {
            self.cancel();
            self.state = LoopState::TornDown;
            log::debug!("Frame loop torn down after {} ticks", self.ticks);
        }
    }

    /// Handle a frame callback.
    ///
    /// # Arguments
    /// * `timestamp_ms` - Callback timestamp from the host
    /// * `tick` - Renders one frame at the given time
    ///
    /// # Returns
    /// Stats when the frame was drawn and a previous callback exists to
    /// measure against.
    pub fn on_frame(
        &mut self,
        timestamp_ms: f64,
        tick: impl FnOnce(f64) -> TickOutcome,
    ) -> Option<AsciiStats> {
        self.pending = None;
        if self.state != LoopState::Running {
            return None;
        }

        let outcome = tick(timestamp_ms);
        self.ticks += 1;

        let previous = self.last_timestamp.replace(timestamp_ms);
        let stats = match outcome {
            TickOutcome::Drawn => previous.and_then(|t| AsciiStats::from_delta(timestamp_ms - t)),
            TickOutcome::Skipped => None,
        };
        if let (Some(stats), Some(callback)) = (stats.as_ref(), self.on_stats.as_mut()) {
            callback(stats);
        }

        self.request();
        stats
    }

    fn request(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The outstanding request, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S: FrameScheduler> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<S: FrameScheduler> std::fmt::Debug for FrameLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drawn(_: f64) -> TickOutcome {
        TickOutcome::Drawn
    }

    // ==================== Stats Tests ====================

    #[test]
    fn test_stats_from_delta() {
        let stats = AsciiStats::from_delta(20.0).unwrap();
        assert_eq!(stats.fps, 50.0);
        assert_eq!(stats.frame_time, 20.0);
        assert!(AsciiStats::from_delta(0.0).is_none());
        assert!(AsciiStats::from_delta(f64::NAN).is_none());
    }

    #[test]
    fn test_stats_label() {
        let stats = AsciiStats::from_delta(20.0).unwrap();
        assert_eq!(stats.label(), "50 FPS | 20.0ms");
    }

    // ==================== Lifecycle Tests ====================

    #[test]
    fn test_start_requests_one_frame() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.start();
        assert_eq!(frames.scheduler().requests(), 1);
        assert!(frames.pending().is_some());
    }

    #[test]
    fn test_first_frame_has_no_stats() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        assert!(frames.on_frame(0.0, drawn).is_none());
        let stats = frames.on_frame(16.0, drawn).unwrap();
        assert_eq!(stats.frame_time, 16.0);
    }

    #[test]
    fn test_paused_loop_never_ticks() {
        let reported = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&reported);
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.set_stats_callback(Some(Box::new(move |_| *sink.borrow_mut() += 1)));
        frames.start();
        frames.pause();

        for i in 0..10 {
            assert!(frames.on_frame(i as f64 * 16.0, drawn).is_none());
        }
        assert_eq!(frames.ticks(), 0);
        assert_eq!(*reported.borrow(), 0);
        assert!(frames.scheduler().pending().is_none());

        frames.play();
        frames.on_frame(500.0, drawn);
        frames.on_frame(516.0, drawn);
        assert_eq!(frames.ticks(), 2);
        assert_eq!(*reported.borrow(), 1);
    }

    #[test]
    fn test_resume_does_not_measure_across_pause() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.on_frame(0.0, drawn);
        frames.pause();
        frames.play();
        assert!(frames.on_frame(10_000.0, drawn).is_none());
    }

    #[test]
    fn test_skipped_frames_report_nothing_but_keep_timing() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.on_frame(0.0, drawn);
        assert!(frames.on_frame(16.0, |_| TickOutcome::Skipped).is_none());
        let stats = frames.on_frame(26.0, drawn).unwrap();
        assert_eq!(stats.frame_time, 10.0);
    }

    #[test]
    fn test_teardown_is_final() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.teardown();
        assert_eq!(frames.scheduler().cancels(), 1);
        frames.play();
        assert!(frames.on_frame(0.0, drawn).is_none());
        assert_eq!(frames.scheduler().requests(), 1);
        assert_eq!(frames.state(), LoopState::TornDown);
    }
}
