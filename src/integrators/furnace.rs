// Copyright @yucwang 2026

//! White-furnace style estimators used to validate materials and lights
//! without any scene geometry. The shading normal is always +z.

use crate::core::bsdf::{ BsdfContext, Material };
use crate::core::rng::LcgRng;
use crate::core::shading::ShadingGeometry;
use crate::emitters::envmap::EnvironmentMap;
use crate::math::constants::{ Float, Vector3f, PI };
use crate::math::spectrum::{ RGBSpectrum, SampledLambdas, SpectralQuantity };
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Agreement between the density a material reports from `sample` and the
/// one it reports from `pdf` for the same direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfConsistency {
    pub samples: usize,
    pub rejected: usize,
    pub max_relative_error: Float,
}

impl PdfConsistency {
    pub fn is_consistent(&self, tolerance: Float) -> bool {
        self.max_relative_error <= tolerance
    }
}

fn shading_normal() -> Vector3f {
    Vector3f::new(0.0, 0.0, 1.0)
}

/// Directional albedo: integral of `bsdf * cos` over the hemisphere, by
/// sampling the material itself. Failed samples count as zero.
pub fn estimate_albedo(material: &Material,
                       ctx: &BsdfContext,
                       wo: &Vector3f,
                       lambdas: &SampledLambdas,
                       sample_count: usize,
                       rng: &mut LcgRng) -> SpectralQuantity {
    let normal = shading_normal();
    let mut sum = SpectralQuantity::default();
    for _ in 0..sample_count {
        let u = rng.next_vec3();
        if let Some(s) = material.sample(&normal, wo, &u, lambdas, ctx) {
            let cos_theta = normal.dot(&s.wi).max(0.0);
            let weight = s.bsdf * (cos_theta / s.pdf);
            if weight.is_finite() {
                sum += weight;
            }
        }
    }
    if sample_count == 0 {
        return sum;
    }
    sum / sample_count as Float
}

pub fn check_sample_pdf_consistency(material: &Material,
                                    ctx: &BsdfContext,
                                    wo: &Vector3f,
                                    lambdas: &SampledLambdas,
                                    sample_count: usize,
                                    rng: &mut LcgRng) -> PdfConsistency {
    let normal = shading_normal();
    let mut result = PdfConsistency { samples: 0, rejected: 0, max_relative_error: 0.0 };
    for _ in 0..sample_count {
        let u = rng.next_vec3();
        let s = match material.sample(&normal, wo, &u, lambdas, ctx) {
            Some(s) => s,
            None => {
                result.rejected += 1;
                continue;
            }
        };
        result.samples += 1;
        let sgeom = ShadingGeometry::make(&normal, &s.wi, wo);
        let pdf = material.pdf(&sgeom, lambdas);
        let error = (pdf - s.pdf).abs() / s.pdf.max(1e-6);
        if error > result.max_relative_error {
            result.max_relative_error = error;
        }
    }
    result
}

/// Integral of the material's density over the upper hemisphere. Values
/// below one mean some samples leave the hemisphere and get rejected.
pub fn estimate_pdf_integral(material: &Material,
                             wo: &Vector3f,
                             lambdas: &SampledLambdas,
                             sample_count: usize,
                             rng: &mut LcgRng) -> Float {
    let normal = shading_normal();
    let mut sum = 0.0f64;
    for _ in 0..sample_count {
        let wi = sample_cosine_hemisphere(&rng.next_vec2());
        let proposal = sample_cosine_hemisphere_pdf(wi.z);
        if proposal <= 0.0 {
            continue;
        }
        let sgeom = ShadingGeometry::make(&normal, &wi, wo);
        sum += (material.pdf(&sgeom, lambdas) / proposal) as f64;
    }
    if sample_count == 0 {
        return 0.0;
    }
    (sum / sample_count as f64) as Float
}

/// Irradiance arriving at a surface facing `normal`, importance sampling
/// the environment.
pub fn estimate_envmap_irradiance(envmap: &EnvironmentMap,
                                  normal: &Vector3f,
                                  sample_count: usize,
                                  rng: &mut LcgRng) -> RGBSpectrum {
    let mut sum = RGBSpectrum::default();
    for _ in 0..sample_count {
        let s = envmap.sample(&rng.next_vec2());
        if s.pdf <= 0.0 {
            continue;
        }
        let cos_theta = normal.dot(&s.direction);
        if cos_theta <= 0.0 {
            continue;
        }
        sum += s.radiance * (cos_theta / s.pdf);
    }
    if sample_count == 0 {
        return sum;
    }
    sum / sample_count as Float
}

/// Outgoing direction at `theta` degrees from the normal.
pub fn direction_at_angle(theta_degrees: Float) -> Vector3f {
    let theta = theta_degrees * PI / 180.0;
    Vector3f::new(theta.sin(), 0.0, theta.cos())
}
