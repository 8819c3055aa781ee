// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

/// Cosines of one shading event. `wi` is the sampled (light-side)
/// direction, `wo` points back along the path; both point away from the
/// surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingGeometry {
    pub nowi: Float,
    pub nowo: Float,
    pub noh: Float,
    pub howo: Float,
    /// `nowi` clamped to the upper hemisphere.
    pub cos_theta: Float,
}

impl ShadingGeometry {
    pub fn make(normal: &Vector3f, wi: &Vector3f, wo: &Vector3f) -> Self {
        let sum = wi + wo;
        let h = if sum.norm_squared() > 1e-12 { sum.normalize() } else { *normal };

        let nowi = clamp_cos(normal.dot(wi));
        Self {
            nowi,
            nowo: clamp_cos(normal.dot(wo)),
            noh: clamp_cos(normal.dot(&h)),
            howo: clamp_cos(h.dot(wo)),
            cos_theta: nowi.max(0.0),
        }
    }

    pub fn same_hemisphere(&self) -> bool {
        self.nowi * self.nowo > 0.0
    }
}

fn clamp_cos(c: Float) -> Float {
    c.max(-1.0).min(1.0)
}
