// Copyright @yucwang 2023

use crate::core::bsdf::{ BSDFSample, BsdfContext };
use crate::core::shading::ShadingGeometry;
use crate::math::constants::{ Float, INV_PI, Vector2f, Vector3f };
use crate::math::frame::transform_frame;
use crate::math::spectrum::{ SampledLambdas, SpectralQuantity };
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Lambertian reflector whose albedo is read from a texture slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffuseMaterial {
    reflectance_texture: usize,
}

impl DiffuseMaterial {
    pub fn new(reflectance_texture: usize) -> Self {
        Self { reflectance_texture }
    }

    pub fn reflectance_texture(&self) -> usize {
        self.reflectance_texture
    }

    pub fn pdf(&self, sgeom: &ShadingGeometry) -> Float {
        if sgeom.nowo <= 0.0 {
            return 0.0;
        }
        sample_cosine_hemisphere_pdf(sgeom.nowi)
    }

    pub fn eval(&self,
                sgeom: &ShadingGeometry,
                lambdas: &SampledLambdas,
                ctx: &BsdfContext) -> SpectralQuantity {
        if sgeom.nowi <= 0.0 || sgeom.nowo <= 0.0 {
            return SpectralQuantity::default();
        }
        match ctx.reflectance(self.reflectance_texture) {
            Some(albedo) => albedo.eval(lambdas) * INV_PI,
            None => SpectralQuantity::default(),
        }
    }

    pub fn sample(&self,
                  normal: &Vector3f,
                  wo: &Vector3f,
                  u: &Vector2f,
                  lambdas: &SampledLambdas,
                  ctx: &BsdfContext) -> Option<BSDFSample> {
        if normal.dot(wo) <= 0.0 {
            return None;
        }
        let wi = transform_frame(&sample_cosine_hemisphere(u), normal).normalize();
        let sgeom = ShadingGeometry::make(normal, &wi, wo);
        let pdf = self.pdf(&sgeom);
        if pdf <= 0.0 {
            return None;
        }
        Some(BSDFSample { bsdf: self.eval(&sgeom, lambdas, ctx), wi, pdf })
    }
}
