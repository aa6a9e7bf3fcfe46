//! Gaussian peak shaping
//!
//! Peaks live in world units and add elevation directly; zones live in
//! normalised [0, 1] grid space and only scale how much terrain shows through.

/// `exp(-dist² / (2 r²))`
#[inline]
pub fn gaussian(dist_sq: f64, radius: f64) -> f64 {
    (-dist_sq / (2.0 * radius * radius)).exp()
}

/// A mountain placed in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: f64,
    pub z: f64,
    /// Summit height in world units
    pub height: f64,
    /// Gaussian spread in world units, must be > 0
    pub radius: f64,
}

impl Peak {
    pub const fn new(x: f64, z: f64, height: f64, radius: f64) -> Self {
        Self {
            x,
            z,
            height,
            radius,
        }
    }

    /// Gaussian falloff at (x, z), 1 at the summit
    pub fn falloff(&self, x: f64, z: f64) -> f64 {
        let dx = x - self.x;
        let dz = z - self.z;
        gaussian(dx * dx + dz * dz, self.radius)
    }

    /// Elevation this peak contributes at (x, z)
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        self.height * self.falloff(x, z)
    }
}

/// Region of the normalised grid where terrain is allowed to rise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakZone {
    /// Centre in normalised (u, v) space
    pub center: [f64; 2],
    /// Gaussian spread in normalised units, must be > 0
    pub radius: f64,
    /// Peak contribution at the centre. Typical range: 0.0 - 1.0
    pub strength: f64,
}

impl PeakZone {
    pub const fn new(center: [f64; 2], radius: f64, strength: f64) -> Self {
        Self {
            center,
            radius,
            strength,
        }
    }

    pub fn contribution(&self, u: f64, v: f64) -> f64 {
        let du = u - self.center[0];
        let dv = v - self.center[1];
        self.strength * gaussian(du * du + dv * dv, self.radius)
    }
}

/// One primary zone plus any number of secondary ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSet {
    pub primary: PeakZone,
    pub secondary: Vec<PeakZone>,
}

impl ZoneSet {
    pub fn new(primary: PeakZone, secondary: Vec<PeakZone>) -> Self {
        Self { primary, secondary }
    }

    pub fn zones(&self) -> impl Iterator<Item = &PeakZone> {
        std::iter::once(&self.primary).chain(self.secondary.iter())
    }

    /// Summed zone contribution clamped to [0, 1]
    pub fn influence(&self, u: f64, v: f64) -> f64 {
        let sum: f64 = self.zones().map(|zone| zone.contribution(u, v)).sum();
        if sum.is_finite() {
            sum.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
