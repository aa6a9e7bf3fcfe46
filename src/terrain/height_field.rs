use std::f64::consts::PI;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::terrain::noise::{NoiseConfig, NoiseField};
use crate::terrain::zones::{Peak, PeakZone, ZoneSet};

/// Rectangular plane centred on the origin, divided into `seg_x × seg_z` cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGrid {
    /// Extent along x, must be > 0
    pub width: f64,
    /// Extent along z, must be > 0
    pub depth: f64,
    /// Cells along x, must be >= 1
    pub seg_x: usize,
    /// Cells along z, must be >= 1
    pub seg_z: usize,
}

impl PlaneGrid {
    pub fn new(width: f64, depth: f64, seg_x: usize, seg_z: usize) -> Self {
        Self {
            width,
            depth,
            seg_x,
            seg_z,
        }
    }

    /// Same extent with roughly `1 / factor` of the resolution, at least one cell per axis
    pub fn coarsened(&self, factor: usize) -> Self {
        let factor = factor.max(1);
        Self {
            seg_x: (self.seg_x / factor).max(1),
            seg_z: (self.seg_z / factor).max(1),
            ..*self
        }
    }

    pub fn columns(&self) -> usize {
        self.seg_x + 1
    }

    pub fn rows(&self) -> usize {
        self.seg_z + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.columns() * self.rows()
    }

    /// Row-major index, `iz` is the outer loop
    pub fn index(&self, ix: usize, iz: usize) -> usize {
        iz * self.columns() + ix
    }

    /// World position of grid vertex (ix, iz)
    pub fn position(&self, ix: usize, iz: usize) -> (f64, f64) {
        let x = ix as f64 * self.width / self.seg_x as f64 - self.width / 2.0;
        let z = iz as f64 * self.depth / self.seg_z as f64 - self.depth / 2.0;
        (x, z)
    }

    /// Map world (x, z) into [0, 1] × [0, 1]
    pub fn normalize(&self, x: f64, z: f64) -> (f64, f64) {
        (
            (x + self.width / 2.0) / self.width,
            (z + self.depth / 2.0) / self.depth,
        )
    }

    /// All vertex positions, row-major
    pub fn positions(&self) -> Vec<(f64, f64)> {
        (0..self.rows())
            .flat_map(|iz| (0..self.columns()).map(move |ix| self.position(ix, iz)))
            .collect()
    }
}

impl Default for PlaneGrid {
    fn default() -> Self {
        Self::new(70.0, 75.0, 80, 65)
    }
}

/// Elevation and zone influence at one grid point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightSample {
    /// Never below the configured floor
    pub elevation: f64,
    /// How strongly peaks shape this point, in [0, 1]
    pub influence: f64,
}

/// Explicit list of Gaussian mountains plus fbm surface texture.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitPeaksConfig {
    pub peaks: Vec<Peak>,
    /// World-to-noise scale of the surface texture
    pub noise_freq: f64,
    /// Surface texture amplitude
    pub noise_amp: f64,
    /// Minimum height, keeps the wireframe visible everywhere
    pub base_floor: f64,
    /// How much the floor itself ripples with the texture noise
    pub floor_noise: f64,
}

impl Default for ExplicitPeaksConfig {
    fn default() -> Self {
        // 最高峰在右上，最矮的在左下
        Self {
            peaks: vec![
                Peak::new(22.0, -28.0, 8.0, 14.0),
                Peak::new(12.0, -15.0, 6.0, 12.0),
                Peak::new(0.0, -2.0, 4.5, 11.0),
                Peak::new(-12.0, 8.0, 3.0, 10.0),
                Peak::new(-20.0, 18.0, 2.0, 9.0),
            ],
            noise_freq: 0.07,
            noise_amp: 0.3,
            base_floor: 0.3,
            floor_noise: 0.2,
        }
    }
}

/// Small sinusoidal bump, `amplitude · (½ + ½ sin(x·fx + phase)) · (½ + ½ cos(z·fz + phase))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorBump {
    pub amplitude: f64,
    pub freq_x: f64,
    pub freq_z: f64,
    pub phase: f64,
}

impl AnchorBump {
    pub const fn new(amplitude: f64, freq_x: f64, freq_z: f64, phase: f64) -> Self {
        Self {
            amplitude,
            freq_x,
            freq_z,
            phase,
        }
    }

    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let sx = 0.5 + 0.5 * (x * self.freq_x + self.phase).sin();
        let cz = 0.5 + 0.5 * (z * self.freq_z + self.phase).cos();
        self.amplitude * sx * cz
    }
}

/// Smooth/ridged noise blend confined to peak zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedRidgeConfig {
    /// World-to-noise scale
    pub noise_freq: f64,
    /// Offset added to both noise coordinates, moves the sampled window
    pub noise_offset: f64,
    /// 0 = pure fbm, 1 = pure ridge fbm
    pub ridge_mix: f64,
    /// Scale applied to the blended noise
    pub peak_height: f64,
    pub anchors: [AnchorBump; 2],
    pub zones: ZoneSet,
    /// Fraction of the terrain kept outside every zone, in [0, 1]
    pub gentle_floor: f64,
}

impl Default for ZonedRidgeConfig {
    fn default() -> Self {
        Self {
            noise_freq: 0.09,
            noise_offset: 4.0,
            ridge_mix: 0.55,
            peak_height: 11.0,
            anchors: [
                AnchorBump::new(0.9, 0.21, 0.17, 1.3),
                AnchorBump::new(0.6, 0.13, 0.29, PI / 3.0),
            ],
            zones: ZoneSet::new(
                PeakZone::new([0.78, 0.2], 0.2, 1.0),
                vec![
                    PeakZone::new([0.55, 0.38], 0.15, 0.75),
                    PeakZone::new([0.3, 0.62], 0.13, 0.5),
                ],
            ),
            gentle_floor: 0.22,
        }
    }
}

/// Terrain shaping strategy, exactly one is active per height field.
#[derive(Debug, Clone, PartialEq)]
pub enum HeightPolicy {
    ExplicitPeaks(ExplicitPeaksConfig),
    ZonedRidge(ZonedRidgeConfig),
}

impl HeightPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            HeightPolicy::ExplicitPeaks(_) => "explicit-peaks",
            HeightPolicy::ZonedRidge(_) => "zoned-ridge",
        }
    }
}

impl Default for HeightPolicy {
    fn default() -> Self {
        HeightPolicy::ZonedRidge(ZonedRidgeConfig::default())
    }
}

/// Generates elevations for a plane grid
#[derive(Debug, Clone)]
pub struct HeightField {
    noise: NoiseField,
    policy: HeightPolicy,
    floor: f64,
}

impl HeightField {
    pub fn new(noise: NoiseConfig, policy: HeightPolicy) -> Self {
        Self {
            noise: NoiseField::new(noise),
            policy,
            floor: 0.0,
        }
    }

    /// Replace the default floor of 0. Negative floors are raised to 0.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = if floor.is_finite() { floor.max(0.0) } else { 0.0 };
        self
    }

    pub fn policy(&self) -> &HeightPolicy {
        &self.policy
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Sample the height field at world position (x, z) of `grid`
    pub fn sample(&self, grid: &PlaneGrid, x: f64, z: f64) -> HeightSample {
        let (elevation, influence) = match &self.policy {
            HeightPolicy::ExplicitPeaks(config) => self.explicit_peaks(config, x, z),
            HeightPolicy::ZonedRidge(config) => {
                let (u, v) = grid.normalize(x, z);
                let influence = config.zones.influence(u, v);
                let raw = self.ridge_terrain(config, x, z);
                (raw * zone_scale(config.gentle_floor, influence), influence)
            }
        };
        HeightSample {
            elevation: self.clamp_floor(elevation),
            influence: if influence.is_finite() {
                influence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    /// Zoned-ridge terrain before zone scaling.
    ///
    /// Returns `None` under the explicit-peaks policy.
    pub fn terrain_before_zoning(&self, x: f64, z: f64) -> Option<f64> {
        match &self.policy {
            HeightPolicy::ZonedRidge(config) => Some(self.ridge_terrain(config, x, z)),
            HeightPolicy::ExplicitPeaks(_) => None,
        }
    }

    /// One sample per grid vertex, row-major
    pub fn generate(&self, grid: &PlaneGrid) -> Vec<HeightSample> {
        let positions = grid.positions();

        #[cfg(not(target_arch = "wasm32"))]
        let samples = positions
            .par_iter()
            .map(|&(x, z)| self.sample(grid, x, z))
            .collect();

        #[cfg(target_arch = "wasm32")]
        let samples = positions
            .iter()
            .map(|&(x, z)| self.sample(grid, x, z))
            .collect();

        samples
    }

    fn explicit_peaks(&self, config: &ExplicitPeaksConfig, x: f64, z: f64) -> (f64, f64) {
        let mut height: f64 = config.peaks.iter().map(|peak| peak.elevation(x, z)).sum();

        let noise = self
            .noise
            .fbm(x * config.noise_freq + 3.0, z * config.noise_freq + 1.0);
        height += noise * config.noise_amp * (0.5 + height * 0.15);
        height = height.max(config.base_floor + noise * config.floor_noise);

        let tallest = config
            .peaks
            .iter()
            .map(|peak| peak.height)
            .fold(0.0, f64::max);
        let influence = if tallest > 0.0 {
            config
                .peaks
                .iter()
                .map(|peak| peak.height / tallest * peak.falloff(x, z))
                .sum::<f64>()
                .clamp(0.0, 1.0)
        } else {
            0.0
        };

        (height, influence)
    }

    fn ridge_terrain(&self, config: &ZonedRidgeConfig, x: f64, z: f64) -> f64 {
        let nx = x * config.noise_freq + config.noise_offset;
        let nz = z * config.noise_freq + config.noise_offset;
        let smooth = self.noise.fbm(nx, nz);
        let sharp = self.noise.ridge_fbm(nx, nz);
        let mix = config.ridge_mix.clamp(0.0, 1.0);
        let blended = smooth + (sharp - smooth) * mix;

        let anchors: f64 = config.anchors.iter().map(|anchor| anchor.sample(x, z)).sum();
        blended * config.peak_height + anchors
    }

    fn clamp_floor(&self, elevation: f64) -> f64 {
        // `!(a > b)` also catches NaN
        if !(elevation > self.floor) {
            self.floor
        } else if elevation.is_finite() {
            elevation
        } else {
            self.floor
        }
    }
}

impl Default for HeightField {
    fn default() -> Self {
        Self::new(NoiseConfig::default(), HeightPolicy::default())
    }
}

/// Share of the terrain kept at a given zone influence
#[inline]
pub fn zone_scale(gentle_floor: f64, influence: f64) -> f64 {
    gentle_floor + (1.0 - gentle_floor) * influence
}
