/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Vector4f = na::Vector4<Float>;
pub type Matrix4f = na::Matrix4<Float>;

pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_TWO_PI: Float = 0.5 * std::f32::consts::FRAC_1_PI;

// Largest float strictly below one, keeps [0, 1) samples half-open.
pub const ONE_MINUS_EPSILON: Float = 1.0 - Float::EPSILON / 2.0;

#[inline]
pub fn sqr(v: Float) -> Float {
    v * v
}

#[inline]
pub fn safe_sqrt(v: Float) -> Float {
    v.max(0.0).sqrt()
}

#[inline]
pub fn lerp(t: Float, start: Float, end: Float) -> Float {
    start * (1.0 - t) + end * t
}
