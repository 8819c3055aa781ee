// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::SigmoidCoefficients;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantTexture {
    coeffs: SigmoidCoefficients,
}

impl ConstantTexture {
    pub fn new(coeffs: SigmoidCoefficients) -> Self {
        Self { coeffs }
    }

    pub fn from_gray(reflectance: Float) -> Self {
        Self::new(SigmoidCoefficients::from_gray(reflectance))
    }

    pub fn fetch(&self, _uv: &Vector2f) -> [Float; 3] {
        self.coeffs.0
    }
}

#[cfg(test)]
mod tests {
    use super::ConstantTexture;
    use crate::math::constants::Vector2f;
    use crate::math::spectrum::{SigmoidCoefficients, Spectrum};

    #[test]
    fn test_constant_texture_fetch() {
        let coeffs = SigmoidCoefficients([0.0, 0.01, -4.0]);
        let tex = ConstantTexture::new(coeffs);
        assert_eq!(tex.fetch(&Vector2f::new(0.1, 0.9)), coeffs.0);
        assert_eq!(tex.fetch(&Vector2f::new(0.7, 0.2)), coeffs.0);
    }

    #[test]
    fn test_gray_texture_evaluates_to_reflectance() {
        let tex = ConstantTexture::from_gray(0.3);
        let s = Spectrum::from_coeff(tex.fetch(&Vector2f::zeros()));
        assert!((s.eval_single(500.0) - 0.3).abs() < 1e-5);
    }
}
