// Copyright @yucwang 2023

use crate::core::shading::ShadingGeometry;
use crate::core::texture::Texture;
use crate::materials::lambertian_diffuse::DiffuseMaterial;
use crate::materials::roughconductor::RoughConductorMaterial;
use crate::materials::roughplastic::RoughPlasticMaterial;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::{ SampledLambdas, SpectralQuantity, Spectrum };

/// A sampled incoming direction together with the full BSDF value and the
/// full density of the material's sampling scheme at that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSample {
    pub bsdf: SpectralQuantity,
    pub wi: Vector3f,
    pub pdf: Float,
}

/// Read-only inputs that vary per shading point but are not geometry.
#[derive(Debug, Clone, Copy)]
pub struct BsdfContext<'a> {
    pub textures: &'a [Texture],
    pub uv: Vector2f,
}

impl<'a> BsdfContext<'a> {
    pub fn new(textures: &'a [Texture], uv: Vector2f) -> Self {
        Self { textures, uv }
    }

    /// Reflectance spectrum stored in a texture slot. Slots that do not
    /// exist reflect nothing.
    pub fn reflectance(&self, texture_id: usize) -> Option<Spectrum> {
        self.textures.get(texture_id)
            .map(|tex| Spectrum::from_coeff(tex.fetch(&self.uv)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Diffuse(DiffuseMaterial),
    RoughConductor(RoughConductorMaterial),
    RoughPlastic(RoughPlasticMaterial),
}

impl Material {
    pub fn name(&self) -> &'static str {
        match self {
            Material::Diffuse(_) => "diffuse",
            Material::RoughConductor(_) => "roughconductor",
            Material::RoughPlastic(_) => "roughplastic",
        }
    }

    pub fn pdf(&self,
               sgeom: &ShadingGeometry,
               lambdas: &SampledLambdas) -> Float {
        match self {
            Material::Diffuse(m) => m.pdf(sgeom),
            Material::RoughConductor(m) => m.pdf(sgeom),
            Material::RoughPlastic(m) => m.pdf(sgeom, lambdas),
        }
    }

    pub fn eval(&self,
                sgeom: &ShadingGeometry,
                lambdas: &SampledLambdas,
                ctx: &BsdfContext) -> SpectralQuantity {
        match self {
            Material::Diffuse(m) => m.eval(sgeom, lambdas, ctx),
            Material::RoughConductor(m) => m.eval(sgeom, lambdas),
            Material::RoughPlastic(m) => m.eval(sgeom, lambdas, ctx),
        }
    }

    /// `u` carries three uniforms; the third picks a lobe where needed.
    pub fn sample(&self,
                  normal: &Vector3f,
                  wo: &Vector3f,
                  u: &Vector3f,
                  lambdas: &SampledLambdas,
                  ctx: &BsdfContext) -> Option<BSDFSample> {
        match self {
            Material::Diffuse(m) => m.sample(normal, wo, &u.xy(), lambdas, ctx),
            Material::RoughConductor(m) => m.sample(normal, wo, &u.xy(), lambdas),
            Material::RoughPlastic(m) => m.sample(normal, wo, u, lambdas, ctx),
        }
    }
}
