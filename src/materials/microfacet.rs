// Copyright @yucwang 2026

//! Isotropic Trowbridge-Reitz (GGX) microfacet distribution.

use crate::core::shading::ShadingGeometry;
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::frame::transform_frame;

// Below this roughness the distribution is numerically a delta.
const MIN_ALPHA: Float = 1e-4;

fn clamp01(v: Float) -> Float {
    if v < 0.0 {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    }
}

/// Normal distribution function D(h); zero for back-facing microfacets.
pub fn ggx_d(noh: Float, alpha: Float) -> Float {
    if noh <= 0.0 {
        return 0.0;
    }
    let a = alpha.max(MIN_ALPHA);
    let a2 = a * a;
    let cos2 = noh.min(1.0) * noh.min(1.0);
    // cos2 (a2 - 1) + 1, kept accurate near noh = 1 for tiny alpha.
    let denom = (1.0 - cos2) + cos2 * a2;
    a2 / (PI * denom * denom)
}

/// Smith monodirectional shadowing-masking for direction `v`.
pub fn ggx_g1(nov: Float, hov: Float, alpha: Float) -> Float {
    if nov == 0.0 || hov / nov <= 0.0 {
        return 0.0;
    }
    let a = alpha.max(MIN_ALPHA);
    let cos2 = nov * nov;
    let sin2 = (1.0 - cos2).max(0.0);
    if sin2 <= 0.0 {
        return 1.0;
    }
    let tan2 = sin2 / cos2;
    let root = (1.0 + a * a * tan2).sqrt();
    2.0 / (1.0 + root)
}

/// Combined shadowing-masking for both directions of a shading event.
pub fn ggx_g(sgeom: &ShadingGeometry, alpha: Float) -> Float {
    // h is the bisector, so h.wi == h.wo.
    ggx_g1(sgeom.nowi, sgeom.howo, alpha) * ggx_g1(sgeom.nowo, sgeom.howo, alpha)
}

/// Draws a microfacet normal proportional to D(h) cos(theta_h) around +z.
pub fn sample_ggx_normal(u: &Vector2f, alpha: Float) -> Vector3f {
    let a = alpha.max(MIN_ALPHA);
    let u1 = clamp01(u.x).min(1.0 - 1e-6);
    let u2 = clamp01(u.y);
    let phi = 2.0 * PI * u2;
    let tan2 = (a * a) * u1 / (1.0 - u1);
    let cos_theta = 1.0 / (1.0 + tan2).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Importance-samples a half-vector around `normal` and reflects `wo`
/// about it. The result may fall below the surface; callers check.
pub fn sample(normal: &Vector3f, wo: &Vector3f, u: &Vector2f, alpha: Float) -> Vector3f {
    let h_local = sample_ggx_normal(u, alpha);
    let h = transform_frame(&h_local, normal);
    reflect(wo, &h).normalize()
}

/// Density of `sample` over incoming directions.
pub fn pdf(sgeom: &ShadingGeometry, alpha: Float) -> Float {
    if sgeom.howo <= 0.0 {
        return 0.0;
    }
    ggx_d(sgeom.noh, alpha) * sgeom.noh / (4.0 * sgeom.howo)
}

pub fn reflect(wo: &Vector3f, m: &Vector3f) -> Vector3f {
    2.0 * wo.dot(m) * m - wo
}
