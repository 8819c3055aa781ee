// Copyright @yucwang 2021

pub mod bsdf;
pub mod emitter;
pub mod error;
pub mod light_sampler;
pub mod rng;
pub mod scene_loader;
pub mod shading;
pub mod texture;
