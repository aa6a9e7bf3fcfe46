use noise::NoiseFn;

/// Constants of the trigonometric lattice hash
/// `fract(sin(ix * a + iy * b) * c)`.
///
/// Any finite values work; `c` should stay large (> 1e4) so neighbouring
/// lattice points decorrelate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashConstants {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for HashConstants {
    fn default() -> Self {
        Self {
            a: 127.1,
            b: 311.7,
            c: 43758.5453,
        }
    }
}

/// Octave layout of a fractal sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalConfig {
    /// Number of octaves to sum. Typical range: 1 - 8
    pub octaves: usize,
    /// Weight of the first octave
    pub amplitude: f64,
    /// Amplitude multiplier between octaves. Typical range: 0.3 - 0.7
    pub gain: f64,
    /// Frequency multiplier between octaves. Typical range: 1.5 - 3.0
    pub lacunarity: f64,
}

impl FractalConfig {
    /// Four octaves at 1, 2, 4, 8 weighted 0.5, 0.25, 0.125, 0.0625
    pub fn fbm() -> Self {
        Self {
            octaves: 4,
            amplitude: 0.5,
            gain: 0.5,
            lacunarity: 2.0,
        }
    }

    /// Cascading ladder used for ridgelines, it never lines up on powers of two
    pub fn ridged() -> Self {
        Self {
            octaves: 4,
            amplitude: 0.5,
            gain: 0.45,
            lacunarity: 2.2,
        }
    }

    /// Sum of all octave weights, the upper bound of the fractal for a [0, 1) source.
    pub fn amplitude_sum(&self) -> f64 {
        (0..self.octaves)
            .map(|octave| self.amplitude * self.gain.powi(octave as i32))
            .sum()
    }
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self::fbm()
    }
}

/// Smoothstep-interpolated value noise over a trig-hashed integer lattice.
///
/// Output is continuous and lies in [0, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeNoise {
    constants: HashConstants,
}

impl LatticeNoise {
    pub fn new(constants: HashConstants) -> Self {
        Self { constants }
    }

    /// Pseudo-random value in [0, 1) for an integer lattice point
    pub fn hash(&self, ix: f64, iy: f64) -> f64 {
        let n = (ix * self.constants.a + iy * self.constants.b).sin() * self.constants.c;
        let f = n - n.floor();
        // tiny negative n rounds `n - floor(n)` up to exactly 1.0
        if f >= 1.0 {
            0.0
        } else {
            f
        }
    }

    /// Bilinear blend of the four surrounding lattice corners
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let ix = x.floor();
        let iy = y.floor();
        let fx = smoothstep(x - ix);
        let fy = smoothstep(y - iy);

        let a = self.hash(ix, iy);
        let b = self.hash(ix + 1.0, iy);
        let c = self.hash(ix, iy + 1.0);
        let d = self.hash(ix + 1.0, iy + 1.0);

        let top = a + (b - a) * fx;
        let bottom = c + (d - c) * fx;
        top + (bottom - top) * fy
    }
}

impl NoiseFn<f64, 2> for LatticeNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

/// Folds a [0, 1] source around its midpoint and squares it, turning rounded
/// hills into V-shaped ridgelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ridge<N> {
    source: N,
}

impl<N> Ridge<N> {
    pub fn new(source: N) -> Self {
        Self { source }
    }
}

impl<N: NoiseFn<f64, 2>> NoiseFn<f64, 2> for Ridge<N> {
    fn get(&self, point: [f64; 2]) -> f64 {
        ridge(self.source.get(point))
    }
}

/// Fractal (octave) sum of any 2D source
#[derive(Debug, Clone, Copy)]
pub struct Fractal<N> {
    source: N,
    config: FractalConfig,
}

impl<N> Fractal<N> {
    pub fn new(source: N, config: FractalConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }
}

impl<N: NoiseFn<f64, 2>> NoiseFn<f64, 2> for Fractal<N> {
    fn get(&self, point: [f64; 2]) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = self.config.amplitude;
        let mut frequency = 1.0;
        for _ in 0..self.config.octaves {
            sum += self.source.get([point[0] * frequency, point[1] * frequency]) * amplitude;
            amplitude *= self.config.gain;
            frequency *= self.config.lacunarity;
        }
        sum
    }
}

/// Noise configuration shared by the terrain policies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    pub hash: HashConstants,
    /// Smooth rolling terrain
    pub fbm: FractalConfig,
    /// Sharp ridgelines
    pub ridged: FractalConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            hash: HashConstants::default(),
            fbm: FractalConfig::fbm(),
            ridged: FractalConfig::ridged(),
        }
    }
}

impl NoiseConfig {
    pub fn new(hash: HashConstants, fbm: FractalConfig, ridged: FractalConfig) -> Self {
        Self { hash, fbm, ridged }
    }
}

/// The terrain noise field: lattice noise plus its smooth and ridged fractal sums.
#[derive(Debug, Clone, Copy)]
pub struct NoiseField {
    lattice: LatticeNoise,
    fbm: Fractal<LatticeNoise>,
    ridged: Fractal<Ridge<LatticeNoise>>,
}

impl NoiseField {
    pub fn new(config: NoiseConfig) -> Self {
        let lattice = LatticeNoise::new(config.hash);
        Self {
            lattice,
            fbm: Fractal::new(lattice, config.fbm),
            ridged: Fractal::new(Ridge::new(lattice), config.ridged),
        }
    }

    pub fn hash(&self, ix: i64, iy: i64) -> f64 {
        self.lattice.hash(ix as f64, iy as f64)
    }

    pub fn smooth_noise(&self, x: f64, y: f64) -> f64 {
        self.lattice.sample(x, y)
    }

    pub fn fbm(&self, x: f64, y: f64) -> f64 {
        self.fbm.get([x, y])
    }

    pub fn ridge_fbm(&self, x: f64, y: f64) -> f64 {
        self.ridged.get([x, y])
    }

    /// Upper bound of [`Self::fbm`]
    pub fn fbm_max(&self) -> f64 {
        self.fbm.config().amplitude_sum()
    }

    /// Upper bound of [`Self::ridge_fbm`]
    pub fn ridge_fbm_max(&self) -> f64 {
        self.ridged.config().amplitude_sum()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

/// `3t² - 2t³`
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// `(1 - |2n - 1|)²`
#[inline]
pub fn ridge(n: f64) -> f64 {
    let folded = 1.0 - (2.0 * n - 1.0).abs();
    folded * folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_range_and_determinism() {
        let field = NoiseField::default();
        for ix in -200..200 {
            for iy in -50..50 {
                let v = field.hash(ix, iy);
                assert!(
                    (0.0..1.0).contains(&v),
                    "hash {} out of range [0, 1) at ({}, {})",
                    v,
                    ix,
                    iy
                );
                assert_eq!(v, field.hash(ix, iy), "hash not deterministic");
            }
        }
    }

    #[test]
    fn test_smooth_noise_matches_lattice_at_integers() {
        let field = NoiseField::default();
        for ix in -10..10 {
            for iy in -10..10 {
                let sampled = field.smooth_noise(ix as f64, iy as f64);
                assert!((sampled - field.hash(ix, iy)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_smooth_noise_has_no_lattice_seams() {
        let field = NoiseField::default();
        for k in -20..20 {
            for j in 0..20 {
                let y = j as f64 * 0.37;
                let left = field.smooth_noise(k as f64 + 0.9999, y);
                let right = field.smooth_noise(k as f64 + 1.0001, y);
                assert!(
                    (left - right).abs() < 1e-3,
                    "seam at x={} y={}: {} vs {}",
                    k + 1,
                    y,
                    left,
                    right
                );
            }
        }
    }

    #[test]
    fn test_smooth_noise_range() {
        let field = NoiseField::default();
        for x in 0..120 {
            for y in 0..120 {
                let v = field.smooth_noise(x as f64 * 0.173 - 7.0, y as f64 * 0.219 - 3.0);
                assert!((0.0..1.0).contains(&v), "smooth noise {} out of range", v);
            }
        }
    }

    #[test]
    fn test_fbm_bounds() {
        let field = NoiseField::default();
        assert!((field.fbm_max() - 0.9375).abs() < 1e-12);
        for x in 0..100 {
            for y in 0..100 {
                let v = field.fbm(x as f64 * 0.31, y as f64 * 0.27);
                assert!(v >= 0.0 && v <= 0.9375, "fbm {} out of [0, 0.9375]", v);
            }
        }
    }

    #[test]
    fn test_ridge_fold() {
        assert_eq!(ridge(0.5), 1.0);
        assert_eq!(ridge(0.0), 0.0);
        assert!((ridge(0.25) - 0.25).abs() < 1e-12);
        assert!((ridge(0.75) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_fbm_bounds() {
        let field = NoiseField::default();
        let max = field.ridge_fbm_max();
        // 0.5 * (1 + 0.45 + 0.45² + 0.45³)
        assert!((max - 0.5 * (1.0 + 0.45 + 0.2025 + 0.091125)).abs() < 1e-12);
        for x in 0..80 {
            for y in 0..80 {
                let v = field.ridge_fbm(x as f64 * 0.13, y as f64 * 0.17);
                assert!(v >= 0.0 && v <= max, "ridge fbm {} out of [0, {}]", v, max);
            }
        }
    }

    #[test]
    fn test_default_config_uses_both_ladders() {
        let config = NoiseConfig::default();
        assert_eq!(config.fbm, FractalConfig::fbm());
        assert_eq!(config.ridged, FractalConfig::ridged());

        // the ridged field must follow the 0.45 / 2.2 ladder, not the fbm one
        let field = NoiseField::default();
        let expected = Fractal::new(
            Ridge::new(LatticeNoise::default()),
            FractalConfig::ridged(),
        );
        assert_eq!(field.ridge_fbm(1.3, 0.7), expected.get([1.3, 0.7]));
    }

    #[test]
    fn test_noise_fn_composes() {
        // The lattice noise behaves like any other `noise` source
        let fbm = Fractal::new(LatticeNoise::default(), FractalConfig::fbm());
        let field = NoiseField::default();
        assert_eq!(fbm.get([1.25, -3.5]), field.fbm(1.25, -3.5));
    }

    #[test]
    fn test_custom_hash_constants_change_field() {
        let default = NoiseField::default();
        let custom = NoiseField::new(NoiseConfig {
            hash: HashConstants {
                a: 12.9898,
                b: 78.233,
                c: 43758.5453,
            },
            ..Default::default()
        });
        let differences = (0..50)
            .filter(|&i| (default.hash(i, 3) - custom.hash(i, 3)).abs() > 1e-6)
            .count();
        assert!(differences > 40, "only {} differences", differences);
    }
}
