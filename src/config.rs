//! Configuration of the whole background
//!
//! Every tuning constant lives in one of the component configs collected here,
//! so the noise and shaping code stays testable without visual tuning.

use crate::animator::AnimationConfig;
use crate::error::{BackgroundError, BackgroundResult};
use crate::scene::{CameraConfig, Coloring, Material, SurfaceStyle, VeinConfig};
use crate::terrain::{
    ElevationGradient, ExplicitPeaksConfig, HeightPolicy, MotionFieldConfig, NoiseConfig,
    PlaneGrid, Rgb, WirePalette, ZonedRidgeConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundConfig {
    pub grid: PlaneGrid,
    pub noise: NoiseConfig,
    pub policy: HeightPolicy,
    /// Lowest allowed elevation, >= 0
    pub floor: f64,
    /// Navy to soft blue by normalised elevation
    pub palette: ElevationGradient,
    pub motion: MotionFieldConfig,
    pub wire_palette: WirePalette,
    pub camera: CameraConfig,
    pub fill: Material,
    pub wire: Material,
    /// `None` disables the coarse overlay
    pub veins: Option<VeinConfig>,
    pub animation: AnimationConfig,
    pub surface: SurfaceStyle,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            grid: PlaneGrid::default(),
            noise: NoiseConfig::default(),
            policy: HeightPolicy::ZonedRidge(ZonedRidgeConfig::default()),
            floor: 0.0,
            palette: ElevationGradient::new(Rgb::from_hex(0x1A3350), Rgb::from_hex(0x5A7FA3)),
            motion: MotionFieldConfig::default(),
            wire_palette: WirePalette::default(),
            camera: CameraConfig::default(),
            fill: Material::fill(0.015),
            wire: Material::wire(0.10, Coloring::Vertex),
            veins: Some(VeinConfig::default()),
            animation: AnimationConfig::default(),
            surface: SurfaceStyle::default(),
        }
    }
}

impl BackgroundConfig {
    /// Five explicit peaks on a diagonal, tallest top-right, with a plain gold wireframe
    pub fn five_peaks() -> Self {
        Self {
            policy: HeightPolicy::ExplicitPeaks(ExplicitPeaksConfig::default()),
            veins: None,
            ..Default::default()
        }
    }

    /// Check the documented ranges of every component
    pub fn validate(&self) -> BackgroundResult<()> {
        let grid = &self.grid;
        if grid.seg_x == 0 || grid.seg_z == 0 {
            return Err(BackgroundError::invalid_config(format!(
                "grid needs at least one segment per axis, got {}x{}",
                grid.seg_x, grid.seg_z
            )));
        }
        if !(grid.width > 0.0 && grid.depth > 0.0) {
            return Err(BackgroundError::invalid_config(format!(
                "grid extent must be positive, got {}x{}",
                grid.width, grid.depth
            )));
        }
        // one u32 index per triangle corner
        let corners = grid.seg_x.saturating_mul(grid.seg_z).saturating_mul(6);
        if corners > u32::MAX as usize {
            return Err(BackgroundError::invalid_config("grid is too dense"));
        }
        if !(self.floor >= 0.0 && self.floor.is_finite()) {
            return Err(BackgroundError::invalid_config("floor must be finite and >= 0"));
        }

        match &self.policy {
            HeightPolicy::ExplicitPeaks(config) => {
                if let Some(peak) = config.peaks.iter().find(|p| !(p.radius > 0.0)) {
                    return Err(BackgroundError::invalid_config(format!(
                        "peak at ({}, {}) has non-positive radius {}",
                        peak.x, peak.z, peak.radius
                    )));
                }
            }
            HeightPolicy::ZonedRidge(config) => {
                if !(0.0..=1.0).contains(&config.gentle_floor) {
                    return Err(BackgroundError::invalid_config(format!(
                        "gentle floor {} outside [0, 1]",
                        config.gentle_floor
                    )));
                }
                if !(0.0..=1.0).contains(&config.ridge_mix) {
                    return Err(BackgroundError::invalid_config(format!(
                        "ridge mix {} outside [0, 1]",
                        config.ridge_mix
                    )));
                }
                if config.zones.zones().any(|zone| !(zone.radius > 0.0)) {
                    return Err(BackgroundError::invalid_config(
                        "peak zone radius must be positive",
                    ));
                }
            }
        }

        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(BackgroundError::invalid_config(format!(
                "field of view {} outside (0, 180)",
                camera.fov_degrees
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(BackgroundError::invalid_config(format!(
                "clip planes must satisfy 0 < near < far, got {} / {}",
                camera.near, camera.far
            )));
        }
        if (camera.position - camera.look_at).length_squared() == 0.0 {
            return Err(BackgroundError::invalid_config("camera looks at its own position"));
        }

        let materials = [Some(&self.fill), Some(&self.wire), self.veins.as_ref().map(|v| &v.material)];
        if materials
            .iter()
            .flatten()
            .any(|m| !(0.0..=1.0).contains(&m.opacity))
        {
            return Err(BackgroundError::invalid_config("material opacity outside [0, 1]"));
        }
        if let Some(veins) = &self.veins {
            if veins.coarsen == 0 {
                return Err(BackgroundError::invalid_config("vein coarsening must be >= 1"));
            }
            if !veins.lift.is_finite() {
                return Err(BackgroundError::invalid_config(format!(
                    "vein lift {} is not finite",
                    veins.lift
                )));
            }
            // the overlay is an edge list without colours of its own
            if !veins.material.wireframe {
                return Err(BackgroundError::invalid_config("vein material must be a wireframe"));
            }
            if veins.material.coloring == Coloring::Vertex {
                return Err(BackgroundError::invalid_config(
                    "vein material needs a uniform colour",
                ));
            }
        }

        let animation = &self.animation;
        if !(0.0..=1.0).contains(&animation.min_motion) {
            return Err(BackgroundError::invalid_config(format!(
                "minimum motion {} outside [0, 1]",
                animation.min_motion
            )));
        }
        if !(animation.amplitude.is_finite() && animation.amplitude >= 0.0) {
            return Err(BackgroundError::invalid_config(format!(
                "animation amplitude {} must be finite and >= 0",
                animation.amplitude
            )));
        }
        if !animation.speed.is_finite() {
            return Err(BackgroundError::invalid_config(format!(
                "animation speed {} is not finite",
                animation.speed
            )));
        }
        let vein = &animation.vein;
        if ![vein.speed, vein.amplitude, vein.freq_x, vein.freq_z]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(BackgroundError::invalid_config("vein wave must be finite"));
        }

        Ok(())
    }
}
