//! Per-tick frame driver.

use crate::backend::Renderer2D;
use crate::images::ImageRegistry;

/// Shortest step handed to the application, in milliseconds.
pub const MIN_DELTA_MS: f64 = 10.0;
/// Longest step handed to the application, in milliseconds. A stalled tab
/// or debugger pause resumes with this step instead of a huge jump.
pub const MAX_DELTA_MS: f64 = 40.0;

/// Turns host timestamps into clamped frame deltas.
#[derive(Debug, Default, Clone)]
pub struct FramePacer {
    last_ms: Option<f64>,
}

impl FramePacer {
    /// A pacer that has not ticked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick at `now_ms` and return the step in seconds.
    ///
    /// The raw delta is rounded to whole milliseconds and clamped to
    /// [`MIN_DELTA_MS`]..=[`MAX_DELTA_MS`]. The first tick has a raw delta of
    /// zero.
    #[expect(clippy::cast_possible_truncation)]
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let raw = self.last_ms.map_or(0.0, |last| (now_ms - last).round());
        self.last_ms = Some(now_ms);
        (raw.clamp(MIN_DELTA_MS, MAX_DELTA_MS) / 1000.0) as f32
    }

    /// Run one frame: tick, hand newly loaded images to `renderer`, then
    /// call [`Renderer2D::render`]. Returns the step for the application's
    /// update.
    pub fn advance<R: Renderer2D + ?Sized>(
        &mut self,
        now_ms: f64,
        renderer: &mut R,
        images: &mut ImageRegistry,
    ) -> f32 {
        let delta = self.tick(now_ms);
        renderer.sync_images(images);
        renderer.render(delta);
        log::trace!("frame at {now_ms} ms, step {delta} s");
        delta
    }
}
