// 地形渲染回调

use eframe::egui;
use eframe::egui_wgpu;
use eframe::egui_wgpu::wgpu;

use super::terrain_renderer::{TerrainFrame, TerrainRenderer};

pub struct TerrainCallback {
    frame: TerrainFrame,
}

impl TerrainCallback {
    pub fn new(frame: TerrainFrame) -> Self {
        Self { frame }
    }
}

impl egui_wgpu::CallbackTrait for TerrainCallback {
    fn prepare(
        &self,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(renderer) = resources.get::<TerrainRenderer>() else {
            return Vec::new();
        };

        // 上传数据到 GPU
        renderer.upload(queue, &self.frame);

        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        resources: &egui_wgpu::CallbackResources,
    ) {
        if let Some(renderer) = resources.get::<TerrainRenderer>() {
            renderer.render(render_pass);
        }
    }
}
