// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};

/// Small deterministic generator for host-side estimators and tests. The
/// sampling routines themselves only ever receive uniforms.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: seed };
        // Decorrelate small neighbouring seeds.
        rng.next_u32();
        rng
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in [0, 1), 24 bits of precision.
    pub fn next_f32(&mut self) -> Float {
        (self.next_u32() >> 8) as Float * (1.0 / (1u32 << 24) as Float)
    }

    pub fn next_vec2(&mut self) -> Vector2f {
        let x = self.next_f32();
        let y = self.next_f32();
        Vector2f::new(x, y)
    }

    pub fn next_vec3(&mut self) -> Vector3f {
        let x = self.next_f32();
        let y = self.next_f32();
        let z = self.next_f32();
        Vector3f::new(x, y, z)
    }
}
