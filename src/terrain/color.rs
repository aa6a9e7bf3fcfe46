/// Linear RGB triple, each component in [0, 1]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Interpolate towards `other`, `t` is clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }

    /// Arithmetic mean of three colours
    pub fn mean3(a: Rgb, b: Rgb, c: Rgb) -> Rgb {
        Rgb {
            r: (a.r + b.r + c.r) / 3.0,
            g: (a.g + b.g + c.g) / 3.0,
            b: (a.b + b.b + c.b) / 3.0,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Two-stop gradient from the lowest to the highest elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationGradient {
    pub low: Rgb,
    pub high: Rgb,
}

impl ElevationGradient {
    pub fn new(low: Rgb, high: Rgb) -> Self {
        Self { low, high }
    }

    /// Colour for an elevation normalised by the grid maximum
    pub fn sample(&self, normalized: f32) -> Rgb {
        self.low.lerp(self.high, normalized)
    }
}
