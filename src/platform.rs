//! Seams between the background and whatever hosts it.

use crate::error::BackgroundResult;
use crate::scene::{Scene, SurfaceStyle};

/// The page (or window) the background lives in
pub trait Host {
    /// Whether the user asked the platform for reduced motion
    fn prefers_reduced_motion(&self) -> bool;

    /// Current viewport size in physical-ish units, only the ratio matters
    fn viewport_size(&self) -> (u32, u32);

    /// Put the rendering surface behind all page content
    fn mount_surface(&mut self, style: &SurfaceStyle) -> BackgroundResult<()>;
}

/// Asks the platform for one more frame callback
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Draws a scene into the mounted surface
pub trait SceneRenderer {
    /// Output size changed
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the scene. Live buffers flagged `needs_upload` must be taken now.
    fn render(&mut self, scene: &Scene);
}

/// Everything the background reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Frame callback, `now` in seconds on a monotonic clock
    Frame { now: f64 },
    VisibilityChanged { hidden: bool },
    Resized { width: u32, height: u32 },
}
