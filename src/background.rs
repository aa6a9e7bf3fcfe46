//! The mountain background as one component: scene plus animator, driven by host events.

use crate::animator::{Animator, AnimatorState};
use crate::config::BackgroundConfig;
use crate::error::BackgroundResult;
use crate::platform::{FrameScheduler, Host, HostEvent, SceneRenderer};
use crate::scene::Scene;

pub struct Background {
    scene: Scene,
    animator: Animator,
}

impl Background {
    /// Build the background and mount its surface.
    ///
    /// Returns `Ok(None)` without touching the page when the host prefers
    /// reduced motion.
    pub fn boot<H: Host>(host: &mut H, config: BackgroundConfig) -> BackgroundResult<Option<Self>> {
        if host.prefers_reduced_motion() {
            log::info!("reduced motion requested, terrain background disabled");
            return Ok(None);
        }
        config.validate()?;

        let (width, height) = host.viewport_size();
        let scene = Scene::assemble(&config, width, height);
        host.mount_surface(&scene.surface)?;

        Ok(Some(Self {
            scene,
            animator: Animator::new(config.animation),
        }))
    }

    /// Schedule the first frame
    pub fn start<S: FrameScheduler>(&self, scheduler: &mut S) {
        if self.animator.is_running() {
            scheduler.request_frame();
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> AnimatorState {
        self.animator.state()
    }

    pub fn elapsed(&self) -> f64 {
        self.animator.elapsed()
    }

    pub fn handle<S, R>(&mut self, event: HostEvent, scheduler: &mut S, renderer: &mut R)
    where
        S: FrameScheduler,
        R: SceneRenderer,
    {
        match event {
            HostEvent::Frame { now } => {
                if self.animator.tick(now, &mut self.scene) {
                    renderer.render(&self.scene);
                    self.scene.mark_uploaded();
                    scheduler.request_frame();
                }
            }
            HostEvent::VisibilityChanged { hidden: true } => {
                self.animator.pause();
            }
            HostEvent::VisibilityChanged { hidden: false } => {
                if self.animator.resume() {
                    scheduler.request_frame();
                }
            }
            HostEvent::Resized { width, height } => {
                if self.scene.camera.set_viewport(width, height) {
                    renderer.resize(width, height);
                }
            }
        }
    }
}
