// Copyright @yucwang 2026

use crate::core::bsdf::BSDFSample;
use crate::core::shading::ShadingGeometry;
use crate::materials::fresnel::fresnel_conductor;
use crate::materials::microfacet;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::{SampledLambdas, SpectralQuantity, Spectrum};

/// Rough metal: GGX microfacets with the complex index `eta + i k`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoughConductorMaterial {
    alpha: Float,
    eta: Spectrum,
    k: Spectrum,
}

impl RoughConductorMaterial {
    pub fn new(alpha: Float, eta: Spectrum, k: Spectrum) -> Self {
        Self { alpha, eta, k }
    }

    pub fn alpha(&self) -> Float {
        self.alpha
    }

    pub fn pdf(&self, sgeom: &ShadingGeometry) -> Float {
        if sgeom.nowi <= 0.0 || sgeom.nowo <= 0.0 {
            return 0.0;
        }
        microfacet::pdf(sgeom, self.alpha)
    }

    pub fn eval(&self, sgeom: &ShadingGeometry, lambdas: &SampledLambdas) -> SpectralQuantity {
        if sgeom.nowi <= 0.0 || sgeom.nowo <= 0.0 || sgeom.howo <= 0.0 {
            return SpectralQuantity::default();
        }
        let d = microfacet::ggx_d(sgeom.noh, self.alpha);
        let g = microfacet::ggx_g(sgeom, self.alpha);
        let f = fresnel_conductor(sgeom.howo, &self.eta.eval(lambdas), &self.k.eval(lambdas));
        f * (d * g / (4.0 * sgeom.nowi * sgeom.nowo))
    }

    pub fn sample(&self,
                  normal: &Vector3f,
                  wo: &Vector3f,
                  u: &Vector2f,
                  lambdas: &SampledLambdas) -> Option<BSDFSample> {
        let wi = microfacet::sample(normal, wo, u, self.alpha);
        let sgeom = ShadingGeometry::make(normal, &wi, wo);
        if !sgeom.same_hemisphere() || sgeom.nowo <= 0.0 {
            return None;
        }
        let pdf = self.pdf(&sgeom);
        if pdf <= 0.0 {
            return None;
        }
        Some(BSDFSample { bsdf: self.eval(&sgeom, lambdas), wi, pdf })
    }
}
