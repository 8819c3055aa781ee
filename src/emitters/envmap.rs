// Copyright @yucwang 2026

use crate::core::error::LoadError;
use crate::io::image_utils::read_bitmap;
use crate::math::bitmap::{Bitmap, WrapMode};
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI, INV_TWO_PI, PI};
use crate::math::distribution::PiecewiseDistribution2D;
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;

/// Result of importance sampling the environment. A zero `pdf` means the
/// sample carries nothing and must be skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvSample {
    pub radiance: RGBSpectrum,
    pub direction: Vector3f,
    pub pdf: Float,
}

impl EnvSample {
    fn empty() -> Self {
        Self { radiance: RGBSpectrum::default(), direction: Vector3f::zeros(), pdf: 0.0 }
    }
}

/// Equirectangular radiance map. In the local frame +y is up; texture row 0
/// holds theta = 0 and `u` runs with phi.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    image: Bitmap,
    scale: Float,
    to_world: Transform,
    distribution: PiecewiseDistribution2D,
}

impl EnvironmentMap {
    pub fn new(image: Bitmap, to_world: Transform, scale: Float) -> Self {
        let width = image.width();
        let height = image.height();
        let mut weights = Vec::with_capacity(width * height);
        for y in 0..height {
            // Rows near the poles cover less solid angle.
            let sin_theta = (PI * (y as Float + 0.5) / height as Float).sin();
            for x in 0..width {
                weights.push(image.average(x, y) * sin_theta);
            }
        }
        let distribution = PiecewiseDistribution2D::new(&weights, width, height);
        if distribution.is_degenerate() {
            log::warn!("EnvironmentMap: {}x{} image carries no energy, sampling is disabled.", width, height);
        }
        log::info!("EnvironmentMap built, width = {}, height = {}.", width, height);

        Self { image, scale, to_world, distribution }
    }

    pub fn from_file(path: &str, to_world: Transform, scale: Float) -> Result<Self, LoadError> {
        let image = read_bitmap(path)?;
        if image.is_empty() {
            return Err(LoadError::Parse(format!("envmap {} has invalid resolution", path)));
        }
        Ok(Self::new(image, to_world, scale))
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    pub fn to_world(&self) -> &Transform {
        &self.to_world
    }

    pub fn radiance_along(&self, direction: &Vector3f) -> RGBSpectrum {
        match self.local_direction(direction) {
            Some(local) => self.lookup(&uv_from_direction(&local)),
            None => RGBSpectrum::default(),
        }
    }

    pub fn sample(&self, u: &Vector2f) -> EnvSample {
        let (uv, pdf_uv) = self.distribution.sample(u);
        if pdf_uv <= 0.0 {
            return EnvSample::empty();
        }
        let theta = uv.y * PI;
        let sin_theta = theta.sin();
        if sin_theta <= 0.0 {
            return EnvSample::empty();
        }

        let local = direction_from_uv(&uv);
        let direction = self.to_world.apply_vector(local);
        let norm = direction.norm();
        if norm <= 0.0 {
            return EnvSample::empty();
        }

        EnvSample {
            radiance: self.lookup(&uv),
            direction: direction / norm,
            pdf: pdf_uv / (2.0 * PI * PI * sin_theta),
        }
    }

    /// Solid-angle density of `sample` producing `direction`.
    pub fn pdf(&self, direction: &Vector3f) -> Float {
        let local = match self.local_direction(direction) {
            Some(local) => local,
            None => return 0.0,
        };
        let uv = uv_from_direction(&local);
        let sin_theta = (uv.y * PI).sin();
        if sin_theta <= 0.0 {
            return 0.0;
        }
        self.distribution.pdf(&uv) / (2.0 * PI * PI * sin_theta)
    }

    /// Solid-angle density at every texel center, for inspection.
    pub fn pdf_image(&self) -> Bitmap {
        let (width, height) = (self.width(), self.height());
        let mut out = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let uv = Vector2f::new((x as Float + 0.5) / width as Float,
                                       (y as Float + 0.5) / height as Float);
                let pdf = self.pdf(&self.to_world.apply_vector(direction_from_uv(&uv)));
                out[(x, y)] = Vector3f::new(pdf, pdf, pdf);
            }
        }
        out
    }

    fn lookup(&self, uv: &Vector2f) -> RGBSpectrum {
        let rgb = self.image.bilinear(uv, WrapMode::Repeat, WrapMode::Clamp);
        RGBSpectrum::from_vector(rgb) * self.scale
    }

    fn local_direction(&self, world: &Vector3f) -> Option<Vector3f> {
        let local = self.to_world.inv_apply_vector(*world);
        let norm = local.norm();
        if norm > 0.0 {
            Some(local / norm)
        } else {
            None
        }
    }
}

/// Texture coordinates of a local direction: `u = phi / 2pi`,
/// `v = theta / pi` with theta measured from +y.
fn uv_from_direction(d: &Vector3f) -> Vector2f {
    let mut u = (-d.z).atan2(-d.x) * INV_TWO_PI + 0.5;
    if u >= 1.0 {
        u -= 1.0;
    }
    let v = d.y.max(-1.0).min(1.0).acos() * INV_PI;
    Vector2f::new(u.max(0.0), v)
}

fn direction_from_uv(uv: &Vector2f) -> Vector3f {
    let theta = uv.y * PI;
    let phi = uv.x * 2.0 * PI;
    let sin_theta = theta.sin();
    Vector3f::new(sin_theta * phi.cos(), theta.cos(), sin_theta * phi.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::constants::Matrix4f;

    fn random_image(width: usize, height: usize, seed: u64) -> Bitmap {
        let mut rng = LcgRng::new(seed);
        let mut image = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = rng.next_f32();
                image[(x, y)] = Vector3f::new(v, 0.5 * v, 0.1 + v);
            }
        }
        image
    }

    fn uniform_sphere(u: &Vector2f) -> Vector3f {
        let z = 1.0 - 2.0 * u.x;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;
        Vector3f::new(r * phi.cos(), r * phi.sin(), z)
    }

    fn rotation_about_y(angle: Float) -> Transform {
        let (s, c) = angle.sin_cos();
        Transform::new(Matrix4f::new(c, 0.0, s, 0.0,
                                     0.0, 1.0, 0.0, 0.0,
                                     -s, 0.0, c, 0.0,
                                     0.0, 0.0, 0.0, 1.0))
    }

    #[test]
    fn test_direction_uv_mapping_is_invertible() {
        let mut rng = LcgRng::new(2);
        for _ in 0..200 {
            let uv = Vector2f::new(rng.next_f32(), 0.02 + 0.96 * rng.next_f32());
            let back = uv_from_direction(&direction_from_uv(&uv));
            let du = (back.x - uv.x).abs();
            assert!(du.min(1.0 - du) < 1e-4, "{:?} {:?}", uv, back);
            assert!((back.y - uv.y).abs() < 1e-4);
        }
        // +y looks at the top row.
        assert!(uv_from_direction(&Vector3f::new(0.0, 1.0, 0.0)).y < 1e-6);
    }

    #[test]
    fn test_sample_and_pdf_agree() {
        let envmap = EnvironmentMap::new(random_image(16, 8, 31), Transform::default(), 1.0);
        let mut rng = LcgRng::new(77);
        let mut checked = 0;
        for _ in 0..200 {
            let s = envmap.sample(&rng.next_vec2());
            if s.pdf <= 0.0 {
                continue;
            }
            checked += 1;
            assert!((s.direction.norm() - 1.0).abs() < 1e-4);
            let pdf = envmap.pdf(&s.direction);
            assert!((pdf - s.pdf).abs() <= 1e-3 * s.pdf, "pdf {} sampled {}", pdf, s.pdf);
            let radiance = envmap.radiance_along(&s.direction);
            assert!((radiance.rgb() - s.radiance.rgb()).norm() < 1e-3);
        }
        assert!(checked > 190);
    }

    #[test]
    fn test_placement_transform_is_applied_everywhere() {
        let mut image = Bitmap::filled(32, 16, Vector3f::new(0.01, 0.01, 0.01));
        // Bright texels around theta = pi/2, phi = 0, which is local +x.
        image[(0, 8)] = Vector3f::new(1000.0, 1000.0, 1000.0);
        image[(31, 8)] = Vector3f::new(1000.0, 1000.0, 1000.0);
        image[(0, 7)] = Vector3f::new(1000.0, 1000.0, 1000.0);
        image[(31, 7)] = Vector3f::new(1000.0, 1000.0, 1000.0);
        let to_world = rotation_about_y(0.5 * PI);
        let envmap = EnvironmentMap::new(image, to_world, 1.0);

        let bright = to_world.apply_vector(Vector3f::new(1.0, 0.0, 0.0));
        let mut rng = LcgRng::new(3);
        let mut near = 0;
        for _ in 0..100 {
            let s = envmap.sample(&rng.next_vec2());
            if s.direction.dot(&bright) > 0.9 {
                near += 1;
            }
            if s.pdf > 0.0 {
                assert!((envmap.pdf(&s.direction) - s.pdf).abs() <= 1e-3 * s.pdf);
            }
        }
        assert!(near > 90, "only {} samples near the bright spot", near);
        assert!(envmap.pdf(&bright) > envmap.pdf(&(-bright)));
        assert!(envmap.radiance_along(&bright).average() > 100.0);
    }

    #[test]
    fn test_uniform_image_gives_uniform_density() {
        let envmap = EnvironmentMap::new(Bitmap::filled(128, 64, Vector3f::new(2.0, 2.0, 2.0)),
                                         Transform::default(), 1.0);
        let expected = 0.25 * INV_PI;
        let mut rng = LcgRng::new(9);
        for _ in 0..500 {
            let d = uniform_sphere(&rng.next_vec2());
            if d.y.abs() > 0.7 {
                continue;
            }
            let pdf = envmap.pdf(&d);
            assert!((pdf - expected).abs() < 0.03 * expected, "pdf {} expected {}", pdf, expected);
            assert!((envmap.radiance_along(&d).average() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_pdf_integrates_to_one_over_sphere() {
        let envmap = EnvironmentMap::new(random_image(64, 32, 5), rotation_about_y(0.3), 1.0);
        let mut rng = LcgRng::new(10);
        let n = 40000;
        let mut integral = 0.0f64;
        for _ in 0..n {
            let d = uniform_sphere(&rng.next_vec2());
            integral += (envmap.pdf(&d) * 4.0 * PI) as f64;
        }
        integral /= n as f64;
        assert!((integral - 1.0).abs() < 0.03, "integral {}", integral);
    }

    #[test]
    fn test_pdf_image_follows_brightness() {
        let mut image = Bitmap::filled(8, 4, Vector3f::new(1.0, 1.0, 1.0));
        image[(2, 1)] = Vector3f::new(9.0, 9.0, 9.0);
        let envmap = EnvironmentMap::new(image, Transform::default(), 1.0);
        let pdf = envmap.pdf_image();
        assert_eq!((pdf.width(), pdf.height()), (8, 4));
        assert!((pdf[(2, 1)].x - 9.0 * pdf[(3, 1)].x).abs() < 1e-3 * pdf[(2, 1)].x);
        // Rows at the same distance from the equator share a density.
        assert!((pdf[(0, 0)].x - pdf[(0, 3)].x).abs() < 1e-4 * pdf[(0, 0)].x);
    }

    #[test]
    fn test_black_image_has_no_samples() {
        let envmap = EnvironmentMap::new(Bitmap::new(8, 4), Transform::default(), 1.0);
        let s = envmap.sample(&Vector2f::new(0.4, 0.6));
        assert_eq!(s.pdf, 0.0);
        assert_eq!(s.direction, Vector3f::zeros());
        assert!(s.radiance.is_black());
        assert_eq!(envmap.pdf(&Vector3f::new(0.0, 0.0, 1.0)), 0.0);
    }
}
