//! eframe application that hosts the background
//!
//! The terrain is painted through a wgpu callback on egui's background layer,
//! the app itself draws no widgets.

use std::sync::mpsc::Receiver;

use eframe::egui_wgpu;

use crate::background::Background;
use crate::error::{BackgroundError, BackgroundResult};
use crate::gpu::{TerrainCallback, TerrainFrame, TerrainRenderer};
use crate::platform::{FrameScheduler, HostEvent, SceneRenderer};
use crate::scene::Scene;

/// Frame requests become egui repaint requests
pub struct EguiScheduler<'a> {
    ctx: &'a egui::Context,
}

impl<'a> EguiScheduler<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl FrameScheduler for EguiScheduler<'_> {
    fn request_frame(&mut self) {
        self.ctx.request_repaint();
    }
}

/// Collects what the GPU callback needs this frame
#[derive(Default)]
struct FrameRecorder {
    frame: Option<TerrainFrame>,
}

impl SceneRenderer for FrameRecorder {
    fn resize(&mut self, width: u32, height: u32) {
        // egui owns the surface, only the camera cares
        log::trace!("terrain output resized to {width}x{height}");
    }

    fn render(&mut self, scene: &Scene) {
        self.frame = Some(TerrainFrame::capture(scene));
    }
}

pub struct BackgroundApp {
    background: Background,
    events: Receiver<HostEvent>,
    viewport: (u32, u32),
    #[cfg(not(target_arch = "wasm32"))]
    minimized: bool,
}

impl BackgroundApp {
    /// Called once before the first frame.
    ///
    /// Uploads the scene into eframe's wgpu state and schedules the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        background: Background,
        events: Receiver<HostEvent>,
    ) -> BackgroundResult<Self> {
        let render_state = cc
            .wgpu_render_state
            .as_ref()
            .ok_or_else(|| BackgroundError::renderer("eframe was not started with wgpu"))?;

        let renderer = TerrainRenderer::new(
            &render_state.device,
            render_state.target_format,
            background.scene(),
        );
        render_state
            .renderer
            .write()
            .callback_resources
            .insert(renderer);

        background.start(&mut EguiScheduler::new(&cc.egui_ctx));

        Ok(Self {
            background,
            events,
            viewport: (0, 0),
            #[cfg(not(target_arch = "wasm32"))]
            minimized: false,
        })
    }

    pub fn background(&self) -> &Background {
        &self.background
    }
}

impl eframe::App for BackgroundApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut scheduler = EguiScheduler::new(ctx);
        let mut recorder = FrameRecorder::default();

        for event in self.events.try_iter() {
            self.background.handle(event, &mut scheduler, &mut recorder);
        }

        // 最小化视为不可见
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(minimized) = ctx.input(|i| i.viewport().minimized) {
            if minimized != self.minimized {
                self.minimized = minimized;
                self.background.handle(
                    HostEvent::VisibilityChanged { hidden: minimized },
                    &mut scheduler,
                    &mut recorder,
                );
            }
        }

        let rect = ctx.screen_rect();
        let viewport = (rect.width().round() as u32, rect.height().round() as u32);
        if viewport != self.viewport {
            self.viewport = viewport;
            self.background.handle(
                HostEvent::Resized {
                    width: viewport.0,
                    height: viewport.1,
                },
                &mut scheduler,
                &mut recorder,
            );
        }

        let now = ctx.input(|i| i.time);
        self.background
            .handle(HostEvent::Frame { now }, &mut scheduler, &mut recorder);

        // egui clears every pass, so the last uploaded geometry is redrawn even when paused
        let frame = recorder.frame.unwrap_or_else(|| TerrainFrame {
            view_proj: self.background.scene().camera.view_proj().to_cols_array_2d(),
            ..Default::default()
        });
        ctx.layer_painter(egui::LayerId::background())
            .add(egui_wgpu::Callback::new_paint_callback(
                rect,
                TerrainCallback::new(frame),
            ));
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        self.background.scene().surface.clear_color
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeHost;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use crate::error::BackgroundResult;
    use crate::platform::Host;
    use crate::scene::SurfaceStyle;

    /// A desktop window used as a preview surface
    pub struct NativeHost {
        size: (u32, u32),
    }

    impl NativeHost {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
            }
        }
    }

    impl Host for NativeHost {
        fn prefers_reduced_motion(&self) -> bool {
            false
        }

        fn viewport_size(&self) -> (u32, u32) {
            self.size
        }

        fn mount_surface(&mut self, style: &SurfaceStyle) -> BackgroundResult<()> {
            log::debug!("window is the surface for #{}", style.element_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackgroundConfig;
    use crate::terrain::PlaneGrid;

    #[test]
    fn test_recorder_captures_dirty_scene() {
        let config = BackgroundConfig {
            grid: PlaneGrid::new(10.0, 10.0, 3, 3),
            ..Default::default()
        };
        let scene = Scene::assemble(&config, 640, 480);
        let mut recorder = FrameRecorder::default();
        recorder.render(&scene);

        let frame = recorder.frame.unwrap();
        assert_eq!(frame.terrain.unwrap().len(), 3 * 3 * 6);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_host_always_boots() {
        use crate::platform::Host;

        let mut host = NativeHost::new(1280, 800);
        assert!(!host.prefers_reduced_motion());
        let config = BackgroundConfig {
            grid: PlaneGrid::new(10.0, 10.0, 3, 3),
            ..Default::default()
        };
        let background = Background::boot(&mut host, config).unwrap();
        assert!(background.is_some());
    }
}
