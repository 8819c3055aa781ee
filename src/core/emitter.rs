// Copyright @yucwang 2026

use crate::math::constants::Float;
use crate::math::spectrum::{ SampledLambdas, SpectralQuantity, Spectrum, LAMBDA_MAX, LAMBDA_MIN };

const POWER_INTEGRATION_STEPS: usize = 100;

/// Spectral emission attached to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    emission: Spectrum,
}

impl Emitter {
    pub fn new(emission: Spectrum) -> Self {
        Self { emission }
    }

    pub fn emission_spectrum(&self) -> &Spectrum {
        &self.emission
    }

    pub fn emission(&self, lambdas: &SampledLambdas) -> SpectralQuantity {
        self.emission.eval(lambdas)
    }

    /// Average emitted radiance over the visible range, midpoint rule.
    /// Emitter geometry is not taken into account, so this is only a
    /// relative weight for light selection, not a radiant power.
    pub fn power(&self) -> Float {
        let step = (LAMBDA_MAX - LAMBDA_MIN) / POWER_INTEGRATION_STEPS as Float;
        let integral: Float = (0..POWER_INTEGRATION_STEPS)
            .map(|i| {
                let lambda = LAMBDA_MIN + (i as Float + 0.5) * step;
                self.emission.eval_single(lambda) * step
            })
            .sum();
        integral / (LAMBDA_MAX - LAMBDA_MIN)
    }
}

/// An emitter bound to a shape owned by the scene geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub emitter: Emitter,
    pub shape_index: usize,
}

impl Light {
    pub fn new(emitter: Emitter, shape_index: usize) -> Self {
        Self { emitter, shape_index }
    }
}

/// A light picked by the light sampler; `pdf` is the selection probability.
#[derive(Debug, Clone, Copy)]
pub struct LightSample<'a> {
    pub light_id: usize,
    pub light: &'a Light,
    pub pdf: Float,
}
