// Copyright @yucwang 2026

use crate::core::error::LoadError;
use crate::io::image_utils::read_bitmap;
use crate::math::bitmap::{Bitmap, WrapMode};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::SigmoidCoefficients;

/// How texel channels of a loaded file are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureEncoding {
    /// Channels already hold sigmoid coefficients.
    Coefficients,
    /// Channels hold linear RGB reflectance, fitted per texel.
    Reflectance,
}

#[derive(Debug, Clone)]
pub struct ImageTexture {
    texels: Bitmap,
    wrap_mode: WrapMode,
}

impl ImageTexture {
    pub fn from_coefficients(texels: Bitmap) -> Self {
        Self { texels, wrap_mode: WrapMode::Repeat }
    }

    pub fn from_reflectance(bitmap: &Bitmap) -> Self {
        let mut texels = Bitmap::new(bitmap.width(), bitmap.height());
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                let p = bitmap[(x, y)];
                let c = SigmoidCoefficients::from_rgb([p.x, p.y, p.z]).0;
                texels[(x, y)] = Vector3f::new(c[0], c[1], clamp_coefficient(c[2]));
            }
        }
        Self::from_coefficients(texels)
    }

    pub fn from_file(path: &str, encoding: TextureEncoding) -> Result<Self, LoadError> {
        let bitmap = read_bitmap(path)?;
        if bitmap.is_empty() {
            return Err(LoadError::Parse(format!("texture {} has no texels", path)));
        }
        Ok(match encoding {
            TextureEncoding::Coefficients => Self::from_coefficients(bitmap),
            TextureEncoding::Reflectance => Self::from_reflectance(&bitmap),
        })
    }

    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    pub fn width(&self) -> usize {
        self.texels.width()
    }

    pub fn height(&self) -> usize {
        self.texels.height()
    }

    pub fn fetch(&self, uv: &Vector2f) -> [Float; 3] {
        // Texture space has v pointing up, bitmaps store the top row first.
        let st = Vector2f::new(uv.x, 1.0 - uv.y);
        let c = self.texels.bilinear(&st, self.wrap_mode, self.wrap_mode);
        [c.x, c.y, c.z]
    }
}

// Black and white map to infinite offsets; keep texels finite so bilinear
// filtering stays well defined.
fn clamp_coefficient(c: Float) -> Float {
    c.max(-1e4).min(1e4)
}
