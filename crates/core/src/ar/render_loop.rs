//! Per-frame timing and drawing.

use super::loader::SceneModel;
use super::Pose;

/// What the renderer is asked to draw each frame.
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub model: Option<&'a SceneModel>,
    /// Reticle pose, when the reticle is showing.
    pub reticle: Option<Pose>,
    /// Seconds since the previous frame.
    pub delta_secs: f32,
}

pub trait Renderer {
    fn draw(&mut self, frame: &FrameSnapshot<'_>);
}

/// Turns the runtime's frame timestamps (milliseconds) into deltas.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick, and any tick whose
    /// timestamp runs backwards, yields zero.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) if timestamp_ms > last => ((timestamp_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        self.last_ms = Some(timestamp_ms);
        delta
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Runs for the lifetime of an AR session.
#[derive(Debug, Default)]
pub struct RenderLoop {
    clock: FrameClock,
    running: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.clock.reset();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.clock.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame delta in seconds, or `None` once the loop has stopped.
    pub fn begin_frame(&mut self, timestamp_ms: f64) -> Option<f32> {
        self.running.then(|| self.clock.tick(timestamp_ms))
    }
}
