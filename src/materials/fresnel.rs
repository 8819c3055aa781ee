// Copyright @yucwang 2026

use crate::math::constants::{Float, sqr};
use crate::math::spectrum::SpectralQuantity;

/// Unpolarized dielectric reflectance. `eta` is the relative index of
/// refraction (transmitted side over incident side); a negative cosine
/// means the ray arrives from the transmitted side.
pub fn fresnel_dielectric(eta: Float, cos_theta_i: Float) -> Float {
    let mut cos_i = cos_theta_i.max(-1.0).min(1.0);
    let mut eta = eta;
    if cos_i < 0.0 {
        eta = 1.0 / eta;
        cos_i = -cos_i;
    }
    if eta <= 0.0 {
        return 1.0;
    }

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = sin2_i / (eta * eta);
    // Total internal reflection.
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).sqrt();

    let r_parl = (eta * cos_i - cos_t) / (eta * cos_i + cos_t);
    let r_perp = (cos_i - eta * cos_t) / (cos_i + eta * cos_t);
    0.5 * (r_parl * r_parl + r_perp * r_perp)
}

/// Conductor reflectance for the complex index `eta + i k`, relative to
/// the surrounding medium.
// https://seblagarde.wordpress.com/2013/04/29/memo-on-fresnel-equations/
pub fn fresnel_conductor(cos_theta_i: Float,
                         eta: &SpectralQuantity,
                         k: &SpectralQuantity) -> SpectralQuantity {
    let cos_i = cos_theta_i.abs().min(1.0);
    // Grazing incidence reflects everything, also for degenerate indices.
    if cos_i == 0.0 {
        return SpectralQuantity::make_constant(1.0);
    }
    let cos2 = cos_i * cos_i;
    let sin2 = 1.0 - cos2;
    let sin4 = sin2 * sin2;

    let eta2 = *eta * *eta;
    let k2 = *k * *k;

    let t0 = eta2 - k2 - SpectralQuantity::make_constant(sin2);
    let a2plusb2 = (t0 * t0 + eta2 * k2 * 4.0).sqrt();
    let t1 = a2plusb2 + SpectralQuantity::make_constant(cos2);
    let a = ((a2plusb2 + t0) * 0.5).sqrt();
    let t2 = a * (2.0 * cos_i);
    let rs = (t1 - t2) / (t1 + t2);

    let t3 = a2plusb2 * cos2 + SpectralQuantity::make_constant(sin4);
    let t4 = t2 * sin2;
    let rp = rs * (t3 - t4) / (t3 + t4);

    (rp + rs) * 0.5
}

/// Hemispherically averaged dielectric reflectance for light arriving from
/// the incident side.
// eta >= 1: d'Eon and Irving (2011); eta < 1: Egan and Hilgeman (1973).
pub fn fresnel_diffuse_reflectance(eta: Float) -> Float {
    if eta < 1.0 {
        -1.4399 / sqr(eta) + 0.7099 / eta + 0.6681 + 0.0636 * eta
    } else {
        let inv = 1.0 / eta;
        let inv2 = inv * inv;
        let inv3 = inv2 * inv;
        let inv4 = inv3 * inv;
        let inv5 = inv4 * inv;
        0.919317 - 3.4793 * inv + 6.75335 * inv2 - 7.80989 * inv3 + 4.98554 * inv4 - 1.36881 * inv5
    }
}
