// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSample, BsdfContext};
use crate::core::shading::ShadingGeometry;
use crate::materials::fresnel::{fresnel_dielectric, fresnel_diffuse_reflectance};
use crate::materials::microfacet;
use crate::math::constants::{Float, Vector3f, INV_PI};
use crate::math::frame::transform_frame;
use crate::math::spectrum::{SampledLambdas, SpectralQuantity, Spectrum};
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};

/// Rough dielectric coating over a diffuse substrate. The coating is a GGX
/// microfacet interface; light refracted into it bounces off the substrate
/// and between the substrate and the underside of the coating.
#[derive(Debug, Clone, PartialEq)]
pub struct RoughPlasticMaterial {
    alpha: Float,
    int_ior: Spectrum,
    ext_ior: Spectrum,
    reflectance_texture: usize,
}

impl RoughPlasticMaterial {
    pub fn new(alpha: Float, int_ior: Spectrum, ext_ior: Spectrum, reflectance_texture: usize) -> Self {
        Self { alpha, int_ior, ext_ior, reflectance_texture }
    }

    pub fn alpha(&self) -> Float {
        self.alpha
    }

    pub fn reflectance_texture(&self) -> usize {
        self.reflectance_texture
    }

    /// Interior over exterior index at the hero wavelength.
    pub fn relative_ior(&self, lambdas: &SampledLambdas) -> Float {
        let int_ior = self.int_ior.eval_single(lambdas.hero());
        let ext_ior = self.ext_ior.eval_single(lambdas.hero());
        if int_ior <= 0.0 || ext_ior <= 0.0 {
            return 1.0;
        }
        int_ior / ext_ior
    }

    /// Probability of picking the specular lobe for a given `wo`.
    fn specular_probability(&self, eta: Float, nowo: Float) -> Float {
        fresnel_dielectric(eta, nowo)
    }

    pub fn pdf(&self, sgeom: &ShadingGeometry, lambdas: &SampledLambdas) -> Float {
        if sgeom.nowi <= 0.0 || sgeom.nowo <= 0.0 {
            return 0.0;
        }
        let eta = self.relative_ior(lambdas);
        let f = self.specular_probability(eta, sgeom.nowo);
        f * microfacet::pdf(sgeom, self.alpha)
            + (1.0 - f) * sample_cosine_hemisphere_pdf(sgeom.cos_theta)
    }

    pub fn eval(&self,
                sgeom: &ShadingGeometry,
                lambdas: &SampledLambdas,
                ctx: &BsdfContext) -> SpectralQuantity {
        if sgeom.nowi <= 0.0 || sgeom.nowo <= 0.0 {
            return SpectralQuantity::default();
        }
        let eta = self.relative_ior(lambdas);

        let specular = if sgeom.howo > 0.0 {
            let d = microfacet::ggx_d(sgeom.noh, self.alpha);
            let g = microfacet::ggx_g(sgeom, self.alpha);
            fresnel_dielectric(eta, sgeom.howo) * d * g / (4.0 * sgeom.nowi * sgeom.nowo)
        } else {
            0.0
        };

        let albedo = match ctx.reflectance(self.reflectance_texture) {
            Some(reflectance) => reflectance.eval(lambdas),
            None => SpectralQuantity::default(),
        };

        let f_i = fresnel_dielectric(eta, sgeom.nowi);
        let f_o = fresnel_dielectric(eta, sgeom.nowo);
        let inv_eta2 = 1.0 / (eta * eta);
        // Diffuse reflectance of the coating seen from inside.
        let ri = 1.0 - inv_eta2 * (1.0 - fresnel_diffuse_reflectance(eta));

        let diffuse = albedo * ((1.0 - f_i) * (1.0 - f_o) * INV_PI)
            / (SpectralQuantity::make_constant(1.0) - albedo * ri);

        SpectralQuantity::make_constant(specular) + diffuse * inv_eta2
    }

    /// Picks a lobe with `u.z`, then reports the value and density of both
    /// lobes combined at the sampled direction.
    pub fn sample(&self,
                  normal: &Vector3f,
                  wo: &Vector3f,
                  u: &Vector3f,
                  lambdas: &SampledLambdas,
                  ctx: &BsdfContext) -> Option<BSDFSample> {
        let nowo = normal.dot(wo);
        if nowo <= 0.0 {
            return None;
        }
        let eta = self.relative_ior(lambdas);

        let wi = if u.z < self.specular_probability(eta, nowo) {
            let wi = microfacet::sample(normal, wo, &u.xy(), self.alpha);
            if normal.dot(&wi) * nowo <= 0.0 {
                return None;
            }
            wi
        } else {
            transform_frame(&sample_cosine_hemisphere(&u.xy()), normal).normalize()
        };

        let sgeom = ShadingGeometry::make(normal, &wi, wo);
        let pdf = self.pdf(&sgeom, lambdas);
        if pdf <= 0.0 {
            return None;
        }
        Some(BSDFSample { bsdf: self.eval(&sgeom, lambdas, ctx), wi, pdf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::core::texture::Texture;
    use crate::math::constants::Vector2f;
    use crate::textures::constant::ConstantTexture;

    fn plastic(alpha: Float) -> RoughPlasticMaterial {
        RoughPlasticMaterial::new(alpha, Spectrum::Constant(1.5), Spectrum::Constant(1.0), 0)
    }

    fn gray_textures(r: Float) -> Vec<Texture> {
        vec![Texture::Constant(ConstantTexture::from_gray(r))]
    }

    #[test]
    fn test_sample_value_matches_eval() {
        let textures = gray_textures(0.5);
        let ctx = BsdfContext::new(&textures, Vector2f::new(0.3, 0.7));
        let material = plastic(0.25);
        let normal = Vector3f::new(0.0, 1.0, 0.0);
        let wo = Vector3f::new(0.6, 0.7, 0.1).normalize();
        let lambdas = SampledLambdas::new_uniform(0.8);
        let mut rng = LcgRng::new(99);
        let mut specular_hits = 0;
        for _ in 0..512 {
            let u = rng.next_vec3();
            if let Some(s) = material.sample(&normal, &wo, &u, &lambdas, &ctx) {
                let sgeom = ShadingGeometry::make(&normal, &s.wi, &wo);
                let value = material.eval(&sgeom, &lambdas, &ctx);
                assert_eq!(value, s.bsdf);
                assert!((material.pdf(&sgeom, &lambdas) - s.pdf).abs() <= 1e-5 * s.pdf.max(1.0));
                if u.z < fresnel_dielectric(1.5, sgeom.nowo) {
                    specular_hits += 1;
                }
            }
        }
        assert!(specular_hits > 0);
    }

    #[test]
    fn test_pdf_is_never_negative() {
        let material = plastic(0.4);
        let normal = Vector3f::new(0.0, 0.0, 1.0);
        let lambdas = SampledLambdas::new_uniform(0.1);
        let mut rng = LcgRng::new(1);
        for _ in 0..1000 {
            let wi = (rng.next_vec3() * 2.0 - Vector3f::new(1.0, 1.0, 1.0)).normalize();
            let wo = (rng.next_vec3() * 2.0 - Vector3f::new(1.0, 1.0, 1.0)).normalize();
            let sgeom = ShadingGeometry::make(&normal, &wi, &wo);
            let pdf = material.pdf(&sgeom, &lambdas);
            assert!(pdf >= 0.0 && pdf.is_finite());
        }
    }

    #[test]
    fn test_smooth_normal_incidence_closed_form() {
        // Looking straight down on a near-smooth coating, off-specular light
        // only sees the diffuse substrate term.
        let albedo = 0.7;
        let textures = gray_textures(albedo);
        let ctx = BsdfContext::new(&textures, Vector2f::zeros());
        let material = plastic(0.0);
        let normal = Vector3f::new(0.0, 0.0, 1.0);
        let wo = normal;
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let lambdas = SampledLambdas::new_uniform(0.5);
        let sgeom = ShadingGeometry::make(&normal, &wi, &wo);

        let f_o = fresnel_dielectric(1.5, 1.0);
        assert!((f_o - 0.04).abs() < 1e-5);
        let f_i = fresnel_dielectric(1.5, 0.8);
        let ri = 1.0 - (1.0 - fresnel_diffuse_reflectance(1.5)) / 2.25;
        let expected = albedo * (1.0 - f_i) * (1.0 - f_o) / ((1.0 - albedo * ri) * std::f32::consts::PI) / 2.25;

        let value = material.eval(&sgeom, &lambdas, &ctx);
        for i in 0..4 {
            assert!((value[i] - expected).abs() < 1e-4, "value {} expected {}", value[i], expected);
        }
        let pdf = material.pdf(&sgeom, &lambdas);
        assert!((pdf - (1.0 - f_o) * 0.8 / std::f32::consts::PI).abs() < 1e-4);

        // The specular lobe is picked with the Fresnel reflectance at wo and
        // returns the mirror direction.
        let s = material.sample(&normal, &wo, &Vector3f::new(0.3, 0.6, 0.01), &lambdas, &ctx);
        let s = s.expect("specular sample");
        assert!((s.wi - normal).norm() < 1e-3);
    }

    #[test]
    fn test_energy_stays_below_one() {
        let textures = gray_textures(1.0);
        let ctx = BsdfContext::new(&textures, Vector2f::zeros());
        let material = plastic(0.3);
        let normal = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.3, 0.2, 0.9).normalize();
        let lambdas = SampledLambdas::new_uniform(0.4);
        let mut rng = LcgRng::new(12);
        let n = 20000;
        let mut albedo = 0.0;
        for _ in 0..n {
            if let Some(s) = material.sample(&normal, &wo, &rng.next_vec3(), &lambdas, &ctx) {
                albedo += s.bsdf[0] * s.wi.z / s.pdf;
            }
        }
        albedo /= n as Float;
        assert!(albedo > 0.5 && albedo < 1.05, "albedo {}", albedo);
    }
}
