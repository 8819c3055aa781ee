// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector2f, Vector3f };

use std::ops;
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Clamp,
}

/// Row-major RGB float image. Row 0 is the top of the image and `v` grows
/// downwards in lookups.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<Vector3f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector3f;

    fn index(&self, index: (usize, usize)) -> &Vector3f {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector3f {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(Vector3f::new(0.0, 0.0, 0.0);
                          pixel_number),
               width: width,
               height: height }
    }

    pub fn filled(width: usize, height: usize, value: Vector3f) -> Self {
        Self { data: vec![value; width * height], width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn average(&self, x: usize, y: usize) -> Float {
        let p = self[(x, y)];
        (p.x + p.y + p.z) / 3.0
    }

    /// Bilinear lookup with texel centers at `(i + 0.5) / size`.
    pub fn bilinear(&self, uv: &Vector2f, wrap_u: WrapMode, wrap_v: WrapMode) -> Vector3f {
        if self.is_empty() {
            return Vector3f::zeros();
        }

        let x = uv.x * self.width as Float - 0.5;
        let y = uv.y * self.height as Float - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;

        let x0 = x0 as isize;
        let y0 = y0 as isize;
        let x0u = wrap_index(x0, self.width, wrap_u);
        let x1u = wrap_index(x0 + 1, self.width, wrap_u);
        let y0u = wrap_index(y0, self.height, wrap_v);
        let y1u = wrap_index(y0 + 1, self.height, wrap_v);

        let top = self[(x0u, y0u)] * (1.0 - tx) + self[(x1u, y0u)] * tx;
        let bottom = self[(x0u, y1u)] * (1.0 - tx) + self[(x1u, y1u)] * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

fn wrap_index(idx: isize, size: usize, mode: WrapMode) -> usize {
    let n = size as isize;
    if n <= 0 {
        return 0;
    }
    match mode {
        WrapMode::Repeat => idx.rem_euclid(n) as usize,
        WrapMode::Clamp => idx.clamp(0, n - 1) as usize,
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::{ Bitmap, WrapMode };
    use crate::math::constants::{ Vector2f, Vector3f };

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 256usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 256);

        bitmap[(5, 6)] = Vector3f::new(1.0, 0.5, 0.6);
        assert_eq!(bitmap[(5, 6)][0], 1.0);
        assert_eq!(bitmap[(2, 6)][0], 0.0);
        assert!((bitmap.average(5, 6) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_hits_texel_centers() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap[(0, 0)] = Vector3f::new(1.0, 0.0, 0.0);
        bitmap[(1, 0)] = Vector3f::new(0.0, 1.0, 0.0);
        bitmap[(0, 1)] = Vector3f::new(0.0, 0.0, 1.0);
        bitmap[(1, 1)] = Vector3f::new(1.0, 1.0, 1.0);

        let c = bitmap.bilinear(&Vector2f::new(0.25, 0.25), WrapMode::Clamp, WrapMode::Clamp);
        assert!((c - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        let mid = bitmap.bilinear(&Vector2f::new(0.5, 0.5), WrapMode::Clamp, WrapMode::Clamp);
        assert!((mid - Vector3f::new(0.5, 0.5, 0.5)).norm() < 1e-6);
    }

    #[test]
    fn test_bilinear_repeat_wraps_horizontally() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap[(0, 0)] = Vector3f::new(2.0, 2.0, 2.0);
        bitmap[(1, 0)] = Vector3f::new(4.0, 4.0, 4.0);
        // u = 0 sits halfway between the last and the first texel.
        let edge = bitmap.bilinear(&Vector2f::new(0.0, 0.5), WrapMode::Repeat, WrapMode::Clamp);
        assert!((edge.x - 3.0).abs() < 1e-6);
        let clamped = bitmap.bilinear(&Vector2f::new(0.0, 0.5), WrapMode::Clamp, WrapMode::Clamp);
        assert!((clamped.x - 2.0).abs() < 1e-6);
    }
}
