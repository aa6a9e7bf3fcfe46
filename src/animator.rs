//! Water-like breathing of the terrain.
//!
//! Every vertex bobs around its base elevation with three overlapping sine
//! waves. The phase and speed of each vertex come from low-frequency noise, so
//! neighbours move together while distant regions drift apart.

use crate::scene::Scene;
use crate::terrain::{TerrainMesh, VeinOverlay, VertexMotion};

/// Coefficients of the three overlapping waves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveConfig {
    /// Spatial frequency of wave 1 along x
    pub x1: f64,
    /// Spatial frequency of wave 2 along z
    pub z2: f64,
    /// Spatial frequencies of wave 3
    pub x3: f64,
    pub z3: f64,
    /// Time scale of waves 2 and 3 relative to wave 1
    pub t2: f64,
    pub t3: f64,
    /// Phase multipliers of waves 2 and 3
    pub phase2: f64,
    pub phase3: f64,
    /// Blend weights, should sum to 1
    pub weights: [f64; 3],
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            x1: 0.08,
            z2: 0.06,
            x3: 0.04,
            z3: 0.05,
            t2: 0.7,
            t3: 0.4,
            phase2: 0.5,
            phase3: 1.2,
            weights: [0.6, 0.3, 0.1],
        }
    }
}

/// Single sine sweep across the vein overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VeinWave {
    pub speed: f64,
    pub amplitude: f64,
    pub freq_x: f64,
    pub freq_z: f64,
}

impl Default for VeinWave {
    fn default() -> Self {
        Self {
            speed: 0.35,
            amplitude: 0.12,
            freq_x: 0.1,
            freq_z: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Global time scale
    pub speed: f64,
    /// Peak vertical offset of a fully influenced vertex
    pub amplitude: f64,
    /// Share of `amplitude` a vertex outside every peak still moves with, in [0, 1]
    pub min_motion: f64,
    pub wave: WaveConfig,
    pub vein: VeinWave,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: 0.08,
            amplitude: 0.2,
            min_motion: 0.3,
            wave: WaveConfig::default(),
            vein: VeinWave::default(),
        }
    }
}

impl AnimationConfig {
    /// Vertical offset of one vertex at elapsed time `t` (seconds)
    pub fn wave_offset(&self, base: [f32; 3], motion: &VertexMotion, t: f64) -> f64 {
        let [x, _, z] = base;
        let (x, z) = (x as f64, z as f64);
        let wave = &self.wave;
        let lt = t * self.speed * motion.speed as f64;
        let ph = motion.phase as f64;

        let w1 = (lt + x * wave.x1 + ph).sin();
        let w2 = (lt * wave.t2 + z * wave.z2 + ph * wave.phase2).sin();
        let w3 = (lt * wave.t3 + x * wave.x3 + z * wave.z3 + ph * wave.phase3).sin();
        let blend = w1 * wave.weights[0] + w2 * wave.weights[1] + w3 * wave.weights[2];

        let motion_scale = self.min_motion + (1.0 - self.min_motion) * motion.influence as f64;
        blend * self.amplitude * motion_scale
    }
}

/// Write `base + offset` into every live vertex, keeping the previous value on non-finite results
pub fn breathe(mesh: &mut TerrainMesh, config: &AnimationConfig, t: f64) {
    for ((live, base), motion) in mesh.live.iter_mut().zip(&mesh.base).zip(&mesh.motions) {
        let y = base[1] as f64 + config.wave_offset(*base, motion, t);
        let y = y as f32;
        if y.is_finite() {
            live[1] = y;
        }
    }
    mesh.needs_upload = true;
}

/// Move the vein overlay with one sine driven by raw (x, z)
pub fn sweep_veins(overlay: &mut VeinOverlay, wave: &VeinWave, t: f64) {
    for (live, base) in overlay.live.iter_mut().zip(&overlay.base) {
        let [x, y, z] = *base;
        let offset = (t * wave.speed + x as f64 * wave.freq_x + z as f64 * wave.freq_z).sin()
            * wave.amplitude;
        let y = (y as f64 + offset) as f32;
        if y.is_finite() {
            live[1] = y;
        }
    }
    overlay.needs_upload = true;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Running,
    Paused,
}

/// Frame-driven animation clock plus the running/paused state machine
#[derive(Debug, Clone)]
pub struct Animator {
    config: AnimationConfig,
    state: AnimatorState,
    /// Seconds of animation shown so far, hidden time never counts
    elapsed: f64,
    /// Timestamp of the previous frame, `None` right after construction or resume
    last_frame: Option<f64>,
}

impl Animator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            state: AnimatorState::Running,
            elapsed: 0.0,
            last_frame: None,
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Running
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    fn transition_to(&mut self, new_state: AnimatorState) {
        log::debug!("animator state transition: {:?} -> {:?}", self.state, new_state);
        self.state = new_state;
    }

    /// Stop animating. Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if self.state == AnimatorState::Paused {
            return false;
        }
        self.transition_to(AnimatorState::Paused);
        true
    }

    /// Start animating again from where the animation stopped. Returns false if already running.
    pub fn resume(&mut self) -> bool {
        if self.state == AnimatorState::Running {
            return false;
        }
        // next frame becomes the new time origin
        self.last_frame = None;
        self.transition_to(AnimatorState::Running);
        true
    }

    /// Advance the clock to `now` (seconds, any monotonic origin) and return elapsed time
    pub fn advance(&mut self, now: f64) -> f64 {
        if let Some(last) = self.last_frame {
            let delta = now - last;
            if delta.is_finite() && delta > 0.0 {
                self.elapsed += delta;
            }
        }
        if now.is_finite() {
            self.last_frame = Some(now);
        }
        self.elapsed
    }

    /// Animate one frame. Does nothing and returns false while paused.
    pub fn tick(&mut self, now: f64, scene: &mut Scene) -> bool {
        if !self.is_running() {
            return false;
        }
        let t = self.advance(now);
        breathe(&mut scene.terrain, &self.config, t);
        if let Some(veins) = &mut scene.veins {
            sweep_veins(&mut veins.overlay, &self.config.vein, t);
        }
        log::trace!("animated frame at t={:.3}s", t);
        true
    }
}
