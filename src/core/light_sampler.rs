// Copyright @yucwang 2026

use crate::core::emitter::{ Light, LightSample };
use crate::math::constants::Float;
use crate::math::distribution::PiecewiseDistribution1D;

/// Picks lights proportionally to their emitted power. Lights are owned by
/// the caller and referred to by index.
#[derive(Debug, Clone)]
pub struct LightSampler {
    distribution: PiecewiseDistribution1D,
    has_lights: bool,
}

impl LightSampler {
    /// Light geometry is not needed: selection weights only depend on the
    /// emission spectra.
    pub fn new(lights: &[Light]) -> Self {
        let powers: Vec<Float> = lights.iter().map(|light| light.emitter.power()).collect();
        let distribution = PiecewiseDistribution1D::new(&powers);
        if !lights.is_empty() && distribution.is_degenerate() {
            log::warn!("LightSampler: all {} lights have zero power, no light will be selected.", lights.len());
        }
        log::debug!("LightSampler built over {} lights.", lights.len());
        Self { distribution, has_lights: !lights.is_empty() }
    }

    pub fn has_lights(&self) -> bool {
        self.has_lights
    }

    pub fn light_count(&self) -> usize {
        if self.has_lights { self.distribution.count() } else { 0 }
    }

    pub fn sample<'a>(&self, lights: &'a [Light], u: Float) -> Option<LightSample<'a>> {
        if !self.has_lights {
            return None;
        }
        let light_id = self.distribution.sample(u).index;
        let light = lights.get(light_id)?;
        let pdf = self.light_sample_pdf(light_id);
        if pdf <= 0.0 {
            return None;
        }
        Some(LightSample { light_id, light, pdf })
    }

    /// Probability of selecting light `light_id`.
    pub fn light_sample_pdf(&self, light_id: usize) -> Float {
        if !self.has_lights || light_id >= self.distribution.count() {
            return 0.0;
        }
        self.distribution.discrete_pmf(light_id)
    }
}
