//! Scene assembly: camera, the translucent fill surface, and the wireframe overlays.

pub mod camera;

pub use camera::{CameraConfig, PerspectiveCamera};

use std::borrow::Cow;

use crate::config::BackgroundConfig;
use crate::terrain::{HeightField, IndexedGrid, Rgb, TerrainMesh, VeinOverlay};

/// How a material picks its colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    /// Per-vertex colour attribute
    Vertex,
    /// One colour for every vertex
    Uniform(Rgb),
}

/// Unlit material.
///
/// Layers are blended over the page and never read or write depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// In [0, 1]
    pub opacity: f32,
    /// Draw the layer's edge list as lines instead of its triangles
    pub wireframe: bool,
    /// `false` culls back faces
    pub double_sided: bool,
    pub coloring: Coloring,
}

impl Material {
    /// Barely visible double-sided fill
    pub fn fill(opacity: f32) -> Self {
        Self {
            opacity,
            wireframe: false,
            double_sided: true,
            coloring: Coloring::Vertex,
        }
    }

    pub fn wire(opacity: f32, coloring: Coloring) -> Self {
        Self {
            opacity,
            wireframe: true,
            double_sided: true,
            coloring,
        }
    }
}

/// Coarse vein overlay settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VeinConfig {
    /// Resolution divisor relative to the terrain grid, >= 1
    pub coarsen: usize,
    /// Vertical offset above the terrain surface
    pub lift: f32,
    /// Must be a wireframe with `Coloring::Uniform`, the overlay carries no vertex colours.
    /// `Scene::vein_colors` paints `Coloring::Vertex` in [`VEIN_BLUE`].
    pub material: Material,
}

/// Soft blue of the vein overlay
pub const VEIN_BLUE: Rgb = Rgb::from_hex(0x5A7FA3);

impl Default for VeinConfig {
    fn default() -> Self {
        Self {
            coarsen: 4,
            lift: 0.04,
            material: Material::wire(0.06, Coloring::Uniform(VEIN_BLUE)),
        }
    }
}

/// Styling of the rendering surface inside the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceStyle {
    pub element_id: String,
    pub aria_hidden: bool,
    /// Inline CSS: fixed behind content, click-through, faded near top and bottom
    pub css: String,
    /// Premultiplied RGBA clear colour
    pub clear_color: [f32; 4],
}

pub const SURFACE_MASK: &str = "linear-gradient(to bottom, transparent 0%, rgba(0,0,0,0.4) 8%, black 18%, black 82%, rgba(0,0,0,0.4) 92%, transparent 100%)";

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            element_id: "terrain-bg".to_owned(),
            aria_hidden: true,
            css: format!(
                "position:fixed;inset:0;width:100vw;height:100vh;z-index:1;pointer-events:none;\
                 -webkit-mask-image:{SURFACE_MASK};mask-image:{SURFACE_MASK};"
            ),
            clear_color: [0.0; 4],
        }
    }
}

/// Coarse overlay and the material it is drawn with
#[derive(Debug, Clone)]
pub struct VeinLayer {
    pub overlay: VeinOverlay,
    pub material: Material,
}

/// Everything the renderer draws, lives as long as the page.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: PerspectiveCamera,
    /// Shared by the fill and the wire overlay
    pub terrain: TerrainMesh,
    pub fill: Material,
    pub wire: Material,
    pub veins: Option<VeinLayer>,
    pub surface: SurfaceStyle,
}

impl Scene {
    pub fn assemble(config: &BackgroundConfig, width: u32, height: u32) -> Self {
        let field = HeightField::new(config.noise, config.policy.clone()).with_floor(config.floor);

        let indexed = IndexedGrid::build(config.grid, &field, &config.palette);
        let terrain = TerrainMesh::build(&indexed, field.noise(), &config.motion, &config.wire_palette);

        let veins = config.veins.map(|veins| VeinLayer {
            overlay: VeinOverlay::build(config.grid.coarsened(veins.coarsen), &field, veins.lift),
            material: veins.material,
        });

        log::info!(
            "assembled {} terrain: {} triangles, max elevation {:.2}, vein overlay {}",
            field.policy().name(),
            terrain.triangle_count(),
            indexed.max_elevation,
            veins
                .as_ref()
                .map(|v| format!("{} vertices", v.overlay.vertex_count()))
                .unwrap_or_else(|| "off".to_owned()),
        );

        Self {
            camera: PerspectiveCamera::new(config.camera, width, height),
            terrain,
            fill: config.fill,
            wire: config.wire,
            veins,
            surface: config.surface.clone(),
        }
    }

    /// Fill colours as the fill material wants them
    pub fn fill_colors(&self) -> Cow<'_, [Rgb]> {
        resolve_colors(&self.fill, &self.terrain.colors, self.terrain.vertex_count())
    }

    /// Wire colours as the wire material wants them
    pub fn wire_colors(&self) -> Cow<'_, [Rgb]> {
        resolve_colors(&self.wire, &self.terrain.wire_colors, self.terrain.vertex_count())
    }

    /// Vein overlay colours, always one per overlay vertex
    pub fn vein_colors(&self) -> Option<Cow<'_, [Rgb]>> {
        self.veins.as_ref().map(|veins| {
            let fallback = match veins.material.coloring {
                Coloring::Uniform(color) => color,
                Coloring::Vertex => VEIN_BLUE,
            };
            Cow::Owned(vec![fallback; veins.overlay.vertex_count()])
        })
    }

    pub fn needs_upload(&self) -> bool {
        self.terrain.needs_upload
            || self
                .veins
                .as_ref()
                .is_some_and(|veins| veins.overlay.needs_upload)
    }

    /// Called once the renderer has taken the live buffers
    pub fn mark_uploaded(&mut self) {
        self.terrain.needs_upload = false;
        if let Some(veins) = &mut self.veins {
            veins.overlay.needs_upload = false;
        }
    }
}

fn resolve_colors<'a>(material: &Material, vertex: &'a [Rgb], count: usize) -> Cow<'a, [Rgb]> {
    match material.coloring {
        Coloring::Vertex => Cow::Borrowed(vertex),
        Coloring::Uniform(color) => Cow::Owned(vec![color; count]),
    }
}
