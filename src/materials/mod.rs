// Copyright @yucwang 2026

pub mod fresnel;
pub mod lambertian_diffuse;
pub mod microfacet;
pub mod roughconductor;
pub mod roughplastic;
