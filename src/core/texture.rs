// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};
use crate::textures::constant::ConstantTexture;
use crate::textures::image::ImageTexture;

/// Reflectance textures store sigmoid-polynomial coefficients, one triple
/// per texel. Materials refer to them by index into a shared slice.
#[derive(Debug, Clone)]
pub enum Texture {
    Constant(ConstantTexture),
    Image(ImageTexture),
}

impl Texture {
    pub fn fetch(&self, uv: &Vector2f) -> [Float; 3] {
        match self {
            Texture::Constant(tex) => tex.fetch(uv),
            Texture::Image(tex) => tex.fetch(uv),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Texture::Constant(_) => String::from("ConstantTexture"),
            Texture::Image(tex) => format!("ImageTexture({}x{})", tex.width(), tex.height()),
        }
    }
}
