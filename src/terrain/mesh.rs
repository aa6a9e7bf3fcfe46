//! Flat-shaded terrain mesh
//!
//! The terrain starts as a shared-vertex grid, then every triangle gets its own
//! three vertices so a face can carry one uniform colour.

use std::f64::consts::PI;

use crate::terrain::color::{ElevationGradient, Rgb};
use crate::terrain::height_field::{HeightField, HeightSample, PlaneGrid};
use crate::terrain::noise::NoiseField;

/// Per-vertex breathing parameters, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexMotion {
    /// Phase offset in radians
    pub phase: f32,
    /// Local speed multiplier
    pub speed: f32,
    /// Zone influence, 0 keeps the vertex almost still
    pub influence: f32,
}

/// Low-frequency fields the motion metadata is sampled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFieldConfig {
    /// Normalised-coordinate scale of the phase field
    pub phase_scale: f64,
    /// Normalised-coordinate scale of the speed field
    pub speed_scale: f64,
    /// Slowest local speed
    pub speed_min: f64,
    /// Extra speed on top of `speed_min`, speeds span [min, min + span)
    pub speed_span: f64,
}

impl Default for MotionFieldConfig {
    fn default() -> Self {
        Self {
            phase_scale: 3.5,
            speed_scale: 2.1,
            speed_min: 0.55,
            speed_span: 0.45,
        }
    }
}

/// Gold wireframe with blue veins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WirePalette {
    pub base: Rgb,
    pub vein: Rgb,
    /// World-to-noise scale of the vein pattern
    pub vein_freq: f64,
    /// Strongest share of `vein` in a wire colour, in [0, 1]
    pub vein_mix: f32,
}

impl Default for WirePalette {
    fn default() -> Self {
        Self {
            base: Rgb::from_hex(0xC9A962),
            vein: Rgb::from_hex(0x5A7FA3),
            vein_freq: 0.12,
            vein_mix: 0.45,
        }
    }
}

impl WirePalette {
    pub fn color_at(&self, noise: &NoiseField, x: f64, z: f64) -> Rgb {
        let vein = noise.smooth_noise(x * self.vein_freq + 50.0, z * self.vein_freq + 50.0) as f32;
        self.base.lerp(self.vein, vein * vein * vein * self.vein_mix)
    }
}

/// Shared-vertex grid with per-vertex elevation and colour
#[derive(Debug, Clone)]
pub struct IndexedGrid {
    pub grid: PlaneGrid,
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<Rgb>,
    pub samples: Vec<HeightSample>,
    /// Triangle list, three indices per face
    pub indices: Vec<u32>,
    /// Highest elevation of this grid, used to normalise colours
    pub max_elevation: f64,
}

impl IndexedGrid {
    pub fn build(grid: PlaneGrid, field: &HeightField, gradient: &ElevationGradient) -> Self {
        let samples = field.generate(&grid);

        let max_elevation = samples
            .iter()
            .map(|s| s.elevation)
            .fold(0.0, f64::max);
        let max_elevation = if max_elevation > 0.0 { max_elevation } else { 1.0 };

        let positions = grid
            .positions()
            .into_iter()
            .zip(&samples)
            .map(|((x, z), sample)| [x as f32, sample.elevation as f32, z as f32])
            .collect();

        let colors = samples
            .iter()
            .map(|sample| gradient.sample((sample.elevation / max_elevation) as f32))
            .collect();

        Self {
            indices: triangle_indices(&grid),
            grid,
            positions,
            colors,
            samples,
            max_elevation,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Two triangles per cell: (a, b, d) and (b, c, d)
fn triangle_indices(grid: &PlaneGrid) -> Vec<u32> {
    let mut indices = Vec::with_capacity(grid.seg_x * grid.seg_z * 6);
    for iz in 0..grid.seg_z {
        for ix in 0..grid.seg_x {
            let a = grid.index(ix, iz) as u32;
            let b = grid.index(ix, iz + 1) as u32;
            let c = grid.index(ix + 1, iz + 1) as u32;
            let d = grid.index(ix + 1, iz) as u32;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}

/// De-indexed, flat-shaded terrain. Vertex `i` belongs to triangle `i / 3`.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    /// Positions fixed at construction
    pub base: Vec<[f32; 3]>,
    /// Animated positions, uploaded to the GPU when `needs_upload` is set
    pub live: Vec<[f32; 3]>,
    /// Per-face fill colour, identical for the three vertices of a face
    pub colors: Vec<Rgb>,
    pub wire_colors: Vec<Rgb>,
    pub motions: Vec<VertexMotion>,
    /// Line list, three edges per triangle
    pub edges: Vec<u32>,
    pub needs_upload: bool,
}

impl TerrainMesh {
    pub fn build(
        indexed: &IndexedGrid,
        noise: &NoiseField,
        motion: &MotionFieldConfig,
        wire: &WirePalette,
    ) -> Self {
        let mut mesh = Self::de_index(indexed);
        mesh.flatten_colors();

        let grid = &indexed.grid;
        mesh.motions = indexed
            .indices
            .iter()
            .map(|&index| {
                let [x, _, z] = indexed.positions[index as usize];
                let (u, v) = grid.normalize(x as f64, z as f64);
                let phase = noise.smooth_noise(
                    u * motion.phase_scale + 10.0,
                    v * motion.phase_scale + 10.0,
                ) * PI
                    * 4.0;
                let speed = motion.speed_min
                    + noise.smooth_noise(
                        u * motion.speed_scale + 20.0,
                        v * motion.speed_scale + 20.0,
                    ) * motion.speed_span;
                VertexMotion {
                    phase: phase as f32,
                    speed: speed as f32,
                    influence: indexed.samples[index as usize].influence as f32,
                }
            })
            .collect();

        mesh.wire_colors = mesh
            .base
            .iter()
            .map(|&[x, _, z]| wire.color_at(noise, x as f64, z as f64))
            .collect();

        mesh
    }

    /// Copy every triangle's vertices out of the shared grid
    pub fn de_index(indexed: &IndexedGrid) -> Self {
        let base: Vec<[f32; 3]> = indexed
            .indices
            .iter()
            .map(|&i| indexed.positions[i as usize])
            .collect();
        let colors = indexed
            .indices
            .iter()
            .map(|&i| indexed.colors[i as usize])
            .collect();
        let edges = (0..base.len() as u32 / 3)
            .flat_map(|face| {
                let i = face * 3;
                [i, i + 1, i + 1, i + 2, i + 2, i]
            })
            .collect();

        Self {
            live: base.clone(),
            base,
            colors,
            wire_colors: Vec::new(),
            motions: Vec::new(),
            edges,
            needs_upload: true,
        }
    }

    /// Give each face the mean colour of its three vertices
    pub fn flatten_colors(&mut self) {
        for face in self.colors.chunks_exact_mut(3) {
            let mean = Rgb::mean3(face[0], face[1], face[2]);
            face.fill(mean);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.base.len() / 3
    }
}

/// Sparse wireframe sampled on a coarser grid from the same height field.
#[derive(Debug, Clone)]
pub struct VeinOverlay {
    pub base: Vec<[f32; 3]>,
    pub live: Vec<[f32; 3]>,
    /// Quad edges only, no diagonals
    pub edges: Vec<u32>,
    pub needs_upload: bool,
}

impl VeinOverlay {
    pub fn build(grid: PlaneGrid, field: &HeightField, lift: f32) -> Self {
        let base: Vec<[f32; 3]> = grid
            .positions()
            .into_iter()
            .zip(field.generate(&grid))
            .map(|((x, z), sample)| [x as f32, sample.elevation as f32 + lift, z as f32])
            .collect();

        let mut edges = Vec::new();
        for iz in 0..grid.rows() {
            for ix in 0..grid.columns() {
                let here = grid.index(ix, iz) as u32;
                if ix + 1 < grid.columns() {
                    edges.extend_from_slice(&[here, grid.index(ix + 1, iz) as u32]);
                }
                if iz + 1 < grid.rows() {
                    edges.extend_from_slice(&[here, grid.index(ix, iz + 1) as u32]);
                }
            }
        }

        Self {
            live: base.clone(),
            base,
            edges,
            needs_upload: true,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::height_field::HeightPolicy;
    use crate::terrain::noise::NoiseConfig;

    fn gradient() -> ElevationGradient {
        ElevationGradient::new(Rgb::from_hex(0x1A3350), Rgb::from_hex(0x5A7FA3))
    }

    fn build(grid: PlaneGrid) -> (IndexedGrid, TerrainMesh) {
        let field = HeightField::default();
        let indexed = IndexedGrid::build(grid, &field, &gradient());
        let mesh = TerrainMesh::build(
            &indexed,
            field.noise(),
            &MotionFieldConfig::default(),
            &WirePalette::default(),
        );
        (indexed, mesh)
    }

    #[test]
    fn test_indexed_grid_counts() {
        let (indexed, mesh) = build(PlaneGrid::new(10.0, 8.0, 5, 4));
        assert_eq!(indexed.positions.len(), 30);
        assert_eq!(indexed.triangle_count(), 40);
        assert_eq!(mesh.vertex_count(), 120);
        assert_eq!(mesh.motions.len(), 120);
        assert_eq!(mesh.wire_colors.len(), 120);
        assert_eq!(mesh.live, mesh.base);
    }

    #[test]
    fn test_vertex_colors_normalised_by_grid_max() {
        let (indexed, _) = build(PlaneGrid::new(40.0, 40.0, 20, 20));
        let gradient = gradient();
        let top = indexed
            .samples
            .iter()
            .position(|s| s.elevation == indexed.max_elevation)
            .unwrap();
        assert!((indexed.colors[top].r - gradient.high.r).abs() < 1e-6);
        assert!((indexed.colors[top].b - gradient.high.b).abs() < 1e-6);
        for (sample, color) in indexed.samples.iter().zip(&indexed.colors) {
            let t = (sample.elevation / indexed.max_elevation) as f32;
            assert_eq!(*color, gradient.sample(t));
        }
    }

    #[test]
    fn test_flattened_faces_use_mean_color() {
        let (indexed, mesh) = build(PlaneGrid::new(12.0, 12.0, 6, 6));
        let original = TerrainMesh::de_index(&indexed);
        for (face, before) in mesh.colors.chunks(3).zip(original.colors.chunks(3)) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[1], face[2]);
            let mean = Rgb::mean3(before[0], before[1], before[2]);
            assert!((face[0].r - mean.r).abs() < 1e-6);
            assert!((face[0].g - mean.g).abs() < 1e-6);
            assert!((face[0].b - mean.b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_edges_cover_each_triangle() {
        let (_, mesh) = build(PlaneGrid::new(4.0, 4.0, 2, 2));
        assert_eq!(mesh.edges.len(), mesh.triangle_count() * 6);
        for (face, edges) in mesh.edges.chunks(6).enumerate() {
            let i = face as u32 * 3;
            assert_eq!(edges, &[i, i + 1, i + 1, i + 2, i + 2, i]);
        }
    }

    #[test]
    fn test_motion_metadata_ranges() {
        let (indexed, mesh) = build(PlaneGrid::default());
        for (motion, &index) in mesh.motions.iter().zip(&indexed.indices) {
            assert!(motion.phase >= 0.0 && motion.phase < (4.0 * PI) as f32 + 1e-4);
            assert!(motion.speed >= 0.55 && motion.speed <= 1.0 + 1e-6);
            assert_eq!(motion.influence, indexed.samples[index as usize].influence as f32);
        }
    }

    #[test]
    fn test_shared_corners_get_identical_motion() {
        // vertices copied from the same grid point must breathe in sync
        let (indexed, mesh) = build(PlaneGrid::new(10.0, 10.0, 4, 4));
        for (a, &ia) in indexed.indices.iter().enumerate() {
            for (b, &ib) in indexed.indices.iter().enumerate().skip(a + 1) {
                if ia == ib {
                    assert_eq!(mesh.motions[a], mesh.motions[b]);
                }
            }
        }
    }

    #[test]
    fn test_vein_overlay_is_sparse_and_lifted() {
        let field = HeightField::new(NoiseConfig::default(), HeightPolicy::default());
        let grid = PlaneGrid::new(20.0, 20.0, 4, 3);
        let overlay = VeinOverlay::build(grid, &field, 0.05);
        assert_eq!(overlay.vertex_count(), 20);
        // horizontal: 4 per row * 4 rows, vertical: 3 per column * 5 columns
        assert_eq!(overlay.edges.len(), 2 * (16 + 15));
        let samples = field.generate(&grid);
        for (position, sample) in overlay.base.iter().zip(&samples) {
            assert!((position[1] - (sample.elevation as f32 + 0.05)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wire_colors_stay_between_gold_and_blue() {
        let (_, mesh) = build(PlaneGrid::new(30.0, 30.0, 10, 10));
        let palette = WirePalette::default();
        for color in &mesh.wire_colors {
            let lo = palette.base.r.min(palette.vein.r);
            let hi = palette.base.r.max(palette.vein.r);
            assert!(color.r >= lo - 1e-6 && color.r <= hi + 1e-6);
        }
    }
}
