// 地形渲染器 - 半透明填充面 + 线框叠加

use bytemuck::{Pod, Zeroable};
use eframe::egui_wgpu::wgpu;
use eframe::egui_wgpu::wgpu::util::DeviceExt;

use crate::scene::{Material, Scene};
use crate::terrain::Rgb;

/// Per-layer uniforms, matches `Layer` in terrain.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LayerUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub opacity: f32,
    pub padding: [f32; 3],
}

impl LayerUniforms {
    pub fn new(view_proj: [[f32; 4]; 4], opacity: f32) -> Self {
        Self {
            view_proj,
            opacity,
            padding: [0.0; 3],
        }
    }
}

/// CPU side of one frame: camera plus any live buffers that changed
#[derive(Debug, Clone, Default)]
pub struct TerrainFrame {
    pub view_proj: [[f32; 4]; 4],
    pub terrain: Option<Vec<[f32; 3]>>,
    pub veins: Option<Vec<[f32; 3]>>,
}

impl TerrainFrame {
    pub fn capture(scene: &Scene) -> Self {
        Self {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            terrain: scene
                .terrain
                .needs_upload
                .then(|| scene.terrain.live.clone()),
            veins: scene
                .veins
                .as_ref()
                .filter(|veins| veins.overlay.needs_upload)
                .map(|veins| veins.overlay.live.clone()),
        }
    }
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Rgb>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        },
    ]
}

/// Primitive state a material asks for: lines for wireframes, back faces culled unless double-sided
pub fn primitive_state(material: &Material) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: if material.wireframe {
            wgpu::PrimitiveTopology::LineList
        } else {
            wgpu::PrimitiveTopology::TriangleList
        },
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: (!material.double_sided).then_some(wgpu::Face::Back),
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    }
}

/// Pieces every layer pipeline shares
struct PipelineParts<'a> {
    device: &'a wgpu::Device,
    bind_group_layout: &'a wgpu::BindGroupLayout,
    pipeline_layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
}

impl PipelineParts<'_> {
    fn create_pipeline(&self, material: &Material, label: &str) -> wgpu::RenderPipeline {
        let buffers = vertex_layouts();
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.target_format,
                        blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: primitive_state(material),
                // 不写深度，永远不遮挡页面内容
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
    }
}

/// Pipeline, colour buffer, uniforms and optional edge list of one drawn layer
struct DrawLayer {
    pipeline: wgpu::RenderPipeline,
    colors: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    opacity: f32,
    /// Line list for wireframe materials, `None` draws the positions as triangles
    edges: Option<(wgpu::Buffer, u32)>,
}

impl DrawLayer {
    fn new(
        parts: &PipelineParts<'_>,
        label: &str,
        material: &Material,
        colors: &[Rgb],
        edges: &[u32],
    ) -> Self {
        let device = parts.device;
        let pipeline = parts.create_pipeline(material, &format!("{label} Pipeline"));

        let colors_label = format!("{label} Colors Buffer");
        let colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(colors_label.as_str()),
            contents: bytemuck::cast_slice(colors),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms_label = format!("{label} Uniforms Buffer");
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(uniforms_label.as_str()),
            contents: bytemuck::cast_slice(&[LayerUniforms::new(
                glam::Mat4::IDENTITY.to_cols_array_2d(),
                material.opacity,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_label = format!("{label} Bind Group");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(bind_group_label.as_str()),
            layout: parts.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let edges = material.wireframe.then(|| {
            let edges_label = format!("{label} Edges Buffer");
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(edges_label.as_str()),
                contents: bytemuck::cast_slice(edges),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, edges.len() as u32)
        });

        Self {
            pipeline,
            colors,
            uniform_buffer,
            bind_group,
            opacity: material.opacity,
            edges,
        }
    }

    fn update_uniforms(&self, queue: &wgpu::Queue, view_proj: [[f32; 4]; 4]) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[LayerUniforms::new(view_proj, self.opacity)]),
        );
    }

    fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        positions: &wgpu::Buffer,
        vertex_count: u32,
    ) {
        let index_count = self.edges.as_ref().map(|(_, count)| *count);
        if vertex_count == 0 || index_count == Some(0) {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, positions.slice(..));
        render_pass.set_vertex_buffer(1, self.colors.slice(..));
        match &self.edges {
            Some((edges, count)) => {
                render_pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..*count, 0, 0..1);
            }
            None => render_pass.draw(0..vertex_count, 0..1),
        }
    }
}

struct VeinBuffers {
    positions: wgpu::Buffer,
    vertex_count: u32,
    layer: DrawLayer,
}

/// 地形渲染器
pub struct TerrainRenderer {
    /// Shared by the fill and the wire overlay
    terrain_positions: wgpu::Buffer,
    terrain_vertex_count: u32,
    fill: DrawLayer,
    wire: DrawLayer,
    veins: Option<VeinBuffers>,
}

impl TerrainRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat, scene: &Scene) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../assets/shaders/terrain.wgsl").into(),
            ),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Terrain Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let parts = PipelineParts {
            device,
            bind_group_layout: &bind_group_layout,
            pipeline_layout: &pipeline_layout,
            shader: &shader,
            target_format,
        };

        let terrain = &scene.terrain;
        let terrain_positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Positions Buffer"),
            contents: bytemuck::cast_slice(&terrain.live),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let fill = DrawLayer::new(
            &parts,
            "Terrain Fill",
            &scene.fill,
            &scene.fill_colors(),
            &terrain.edges,
        );
        let wire = DrawLayer::new(
            &parts,
            "Terrain Wire",
            &scene.wire,
            &scene.wire_colors(),
            &terrain.edges,
        );

        let veins = scene.veins.as_ref().zip(scene.vein_colors()).map(|(veins, colors)| {
            let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vein Positions Buffer"),
                contents: bytemuck::cast_slice(&veins.overlay.live),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            VeinBuffers {
                positions,
                vertex_count: veins.overlay.vertex_count() as u32,
                layer: DrawLayer::new(
                    &parts,
                    "Vein",
                    &veins.material,
                    &colors,
                    &veins.overlay.edges,
                ),
            }
        });

        log::info!(
            "terrain renderer ready: {} vertices, {} wire edges, veins {}",
            terrain.vertex_count(),
            terrain.edges.len() / 2,
            if veins.is_some() { "on" } else { "off" }
        );

        Self {
            terrain_positions,
            terrain_vertex_count: terrain.vertex_count() as u32,
            fill,
            wire,
            veins,
        }
    }

    /// 上传数据到 GPU
    pub fn upload(&self, queue: &wgpu::Queue, frame: &TerrainFrame) {
        if let Some(positions) = &frame.terrain {
            queue.write_buffer(&self.terrain_positions, 0, bytemuck::cast_slice(positions));
        }
        if let (Some(veins), Some(positions)) = (&self.veins, &frame.veins) {
            queue.write_buffer(&veins.positions, 0, bytemuck::cast_slice(positions));
        }

        self.fill.update_uniforms(queue, frame.view_proj);
        self.wire.update_uniforms(queue, frame.view_proj);
        if let Some(veins) = &self.veins {
            veins.layer.update_uniforms(queue, frame.view_proj);
        }
    }

    /// 渲染：填充面在下，线框在上
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        self.fill
            .draw(render_pass, &self.terrain_positions, self.terrain_vertex_count);
        self.wire
            .draw(render_pass, &self.terrain_positions, self.terrain_vertex_count);
        if let Some(veins) = &self.veins {
            veins
                .layer
                .draw(render_pass, &veins.positions, veins.vertex_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackgroundConfig;
    use crate::terrain::PlaneGrid;

    #[test]
    fn test_materials_drive_primitive_state() {
        let fill = primitive_state(&Material::fill(0.015));
        assert_eq!(fill.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(fill.cull_mode, None);

        let wire = primitive_state(&Material::wire(0.1, crate::scene::Coloring::Vertex));
        assert_eq!(wire.topology, wgpu::PrimitiveTopology::LineList);

        let single_sided = Material {
            double_sided: false,
            ..Material::fill(0.015)
        };
        assert_eq!(primitive_state(&single_sided).cull_mode, Some(wgpu::Face::Back));

        let solid_wire = Material {
            wireframe: false,
            ..Material::wire(0.1, crate::scene::Coloring::Vertex)
        };
        assert_eq!(
            primitive_state(&solid_wire).topology,
            wgpu::PrimitiveTopology::TriangleList
        );
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        // mat4x4<f32> + f32 padded to a 16 byte multiple
        assert_eq!(std::mem::size_of::<LayerUniforms>(), 80);
    }

    #[test]
    fn test_capture_only_copies_dirty_buffers() {
        let config = BackgroundConfig {
            grid: PlaneGrid::new(10.0, 10.0, 4, 4),
            ..Default::default()
        };
        let mut scene = Scene::assemble(&config, 800, 600);

        let frame = TerrainFrame::capture(&scene);
        assert_eq!(frame.terrain.as_ref().map(Vec::len), Some(scene.terrain.vertex_count()));
        assert!(frame.veins.is_some());

        scene.mark_uploaded();
        let frame = TerrainFrame::capture(&scene);
        assert!(frame.terrain.is_none() && frame.veins.is_none());
        assert_eq!(frame.view_proj, scene.camera.view_proj().to_cols_array_2d());
    }
}
