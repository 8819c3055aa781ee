// Copyright 2020 @TwoCookingMice

use std::ops;

use super::constants::{ Float, Vector3f, Vector4f, lerp };

/// Shortest wavelength (nm) carried by a path.
pub const LAMBDA_MIN: Float = 360.0;
/// Longest wavelength (nm) carried by a path.
pub const LAMBDA_MAX: Float = 830.0;
pub const N_SPECTRUM_SAMPLES: usize = 4;

/// Wavelengths traced together by one path; index 0 is the hero wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledLambdas {
    lambda: [Float; N_SPECTRUM_SAMPLES],
}

impl SampledLambdas {
    /// Hero-wavelength sampling: the remaining wavelengths are spaced evenly
    /// and wrap back into the visible range.
    pub fn new_uniform(u: Float) -> Self {
        let range = LAMBDA_MAX - LAMBDA_MIN;
        let delta = range / N_SPECTRUM_SAMPLES as Float;
        let mut lambda = [0.0; N_SPECTRUM_SAMPLES];
        lambda[0] = lerp(u.max(0.0).min(1.0), LAMBDA_MIN, LAMBDA_MAX);
        for i in 1..N_SPECTRUM_SAMPLES {
            lambda[i] = lambda[i - 1] + delta;
            if lambda[i] > LAMBDA_MAX {
                lambda[i] = LAMBDA_MIN + (lambda[i] - LAMBDA_MAX);
            }
        }
        Self { lambda }
    }

    pub fn from_values(lambda: [Float; N_SPECTRUM_SAMPLES]) -> Self {
        Self { lambda }
    }

    pub fn hero(&self) -> Float {
        self.lambda[0]
    }
}

impl ops::Index<usize> for SampledLambdas {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.lambda[index]
    }
}

/// One value per sampled wavelength: radiance, reflectance or a BSDF value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralQuantity(Vector4f);

impl Default for SpectralQuantity {
    fn default() -> Self {
        Self(Vector4f::zeros())
    }
}

impl SpectralQuantity {
    pub fn new(values: [Float; N_SPECTRUM_SAMPLES]) -> Self {
        Self(Vector4f::new(values[0], values[1], values[2], values[3]))
    }

    pub fn make_constant(v: Float) -> Self {
        Self(Vector4f::repeat(v))
    }

    pub fn from_fn<F: FnMut(usize) -> Float>(mut f: F) -> Self {
        Self(Vector4f::from_fn(|i, _| f(i)))
    }

    pub fn is_black(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn average(&self) -> Float {
        self.0.sum() / N_SPECTRUM_SAMPLES as Float
    }

    pub fn max_value(&self) -> Float {
        self.0.max()
    }

    pub fn sqrt(&self) -> Self {
        Self(self.0.map(|v| v.max(0.0).sqrt()))
    }
}

impl ops::Index<usize> for SpectralQuantity {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.0[index]
    }
}

impl ops::Add for SpectralQuantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl ops::AddAssign for SpectralQuantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl ops::Sub for SpectralQuantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl ops::Mul for SpectralQuantity {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0.component_mul(&rhs.0))
    }
}

impl ops::MulAssign for SpectralQuantity {
    fn mul_assign(&mut self, rhs: Self) {
        self.0.component_mul_assign(&rhs.0);
    }
}

impl ops::Div for SpectralQuantity {
    type Output = Self;

    /// Component-wise division, zero where the divisor is zero.
    fn div(self, rhs: Self) -> Self {
        Self(self.0.zip_map(&rhs.0, |a, b| if b != 0.0 { a / b } else { 0.0 }))
    }
}

impl ops::Mul<Float> for SpectralQuantity {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self(self.0 * rhs)
    }
}

impl ops::Mul<SpectralQuantity> for Float {
    type Output = SpectralQuantity;

    fn mul(self, rhs: SpectralQuantity) -> SpectralQuantity {
        SpectralQuantity(rhs.0 * self)
    }
}

impl ops::Div<Float> for SpectralQuantity {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self(self.0 / rhs)
    }
}

/// Red, green and blue reference wavelengths for `from_rgb`.
const RGB_FIT_WAVELENGTHS: [Float; 3] = [610.0, 550.0, 465.0];
const RGB_FIT_MIN: Float = 1e-4;

/// Coefficients of `sigmoid(c0 λ² + c1 λ + c2)`, λ in nanometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidCoefficients(pub [Float; 3]);

impl SigmoidCoefficients {
    /// Coefficients of a wavelength-constant reflectance `r`.
    pub fn from_gray(r: Float) -> Self {
        let r = r.max(0.0).min(1.0);
        let c2 = if r <= 0.0 {
            Float::NEG_INFINITY
        } else if r >= 1.0 {
            Float::INFINITY
        } else {
            (2.0 * r - 1.0) / (2.0 * (r * (1.0 - r)).sqrt())
        };
        Self([0.0, 0.0, c2])
    }

    /// Fits the quadratic through the inverse sigmoid of each channel,
    /// placed at the red, green and blue reference wavelengths. Gray input
    /// gives the same coefficients as `from_gray`.
    pub fn from_rgb(rgb: [Float; 3]) -> Self {
        if rgb[0] == rgb[1] && rgb[1] == rgb[2] {
            return Self::from_gray(rgb[0]);
        }
        let x: Vec<f64> = rgb
            .iter()
            .map(|&c| {
                let r = c.max(RGB_FIT_MIN).min(1.0 - RGB_FIT_MIN) as f64;
                (2.0 * r - 1.0) / (2.0 * (r * (1.0 - r)).sqrt())
            })
            .collect();

        let l = RGB_FIT_WAVELENGTHS.map(|v| v as f64);
        let (mut c0, mut c1, mut c2) = (0.0f64, 0.0f64, 0.0f64);
        for i in 0..3 {
            let (j, k) = ((i + 1) % 3, (i + 2) % 3);
            let w = x[i] / ((l[i] - l[j]) * (l[i] - l[k]));
            c0 += w;
            c1 -= w * (l[j] + l[k]);
            c2 += w * l[j] * l[k];
        }
        Self([c0 as Float, c1 as Float, c2 as Float])
    }

    pub fn eval(&self, lambda: Float) -> Float {
        let [c0, c1, c2] = self.0;
        // c2 alone may be infinite for pure black or white.
        let x = if c0 == 0.0 && c1 == 0.0 { c2 } else { (c0 * lambda + c1) * lambda + c2 };
        sigmoid(x)
    }
}

fn sigmoid(x: Float) -> Float {
    if x.is_infinite() {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }
    0.5 + x / (2.0 * (1.0 + x * x).sqrt())
}

/// Planck's law, `lambda` in nanometers, `temperature` in Kelvin.
pub fn blackbody(lambda: Float, temperature: Float) -> Float {
    if temperature <= 0.0 {
        return 0.0;
    }
    const C: f64 = 299_792_458.0;
    const H: f64 = 6.626_070_15e-34;
    const KB: f64 = 1.380_649e-23;
    let l = lambda as f64 * 1e-9;
    let le = (2.0 * H * C * C) / (l.powi(5) * (((H * C) / (l * KB * temperature as f64)).exp() - 1.0));
    le as Float
}

/// Continuous spectral distributions consumed by materials and emitters.
#[derive(Debug, Clone, PartialEq)]
pub enum Spectrum {
    Constant(Float),
    /// Sorted `(wavelengths, values)`; clamps to the end values inside the
    /// visible range.
    PiecewiseLinear { lambdas: Vec<Float>, values: Vec<Float> },
    RgbSigmoid { coeffs: SigmoidCoefficients, scale: Float },
    /// Planck emission normalized so its peak is `scale`.
    Blackbody { temperature: Float, scale: Float },
}

impl Spectrum {
    pub fn from_coeff(coeffs: [Float; 3]) -> Self {
        Spectrum::RgbSigmoid { coeffs: SigmoidCoefficients(coeffs), scale: 1.0 }
    }

    pub fn piecewise_linear(mut samples: Vec<(Float, Float)>) -> Self {
        samples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (lambdas, values) = samples.into_iter().unzip();
        Spectrum::PiecewiseLinear { lambdas, values }
    }

    pub fn eval_single(&self, lambda: Float) -> Float {
        if !(LAMBDA_MIN..=LAMBDA_MAX).contains(&lambda) {
            return 0.0;
        }
        match self {
            Spectrum::Constant(c) => *c,
            Spectrum::PiecewiseLinear { lambdas, values } => {
                eval_piecewise_linear(lambdas, values, lambda)
            }
            Spectrum::RgbSigmoid { coeffs, scale } => scale * coeffs.eval(lambda),
            Spectrum::Blackbody { temperature, scale } => {
                // Wien's displacement law gives the peak wavelength.
                let lambda_max = 2.897_772_1e-3 / temperature * 1e9;
                let peak = blackbody(lambda_max, *temperature);
                if peak > 0.0 {
                    scale * blackbody(lambda, *temperature) / peak
                } else {
                    0.0
                }
            }
        }
    }

    pub fn eval(&self, lambdas: &SampledLambdas) -> SpectralQuantity {
        SpectralQuantity::from_fn(|i| self.eval_single(lambdas[i]))
    }
}

fn eval_piecewise_linear(lambdas: &[Float], values: &[Float], lambda: Float) -> Float {
    if lambdas.is_empty() {
        return 0.0;
    }
    let last = lambdas.len() - 1;
    if lambda <= lambdas[0] {
        return values[0];
    }
    if lambda >= lambdas[last] {
        return values[last];
    }
    let i = lambdas.partition_point(|&l| l <= lambda) - 1;
    let t = (lambda - lambdas[i]) / (lambdas[i + 1] - lambdas[i]);
    lerp(t, values[i], values[i + 1])
}

/// Linear RGB triple, used for image-based radiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::zeros() }
    }
}

impl RGBSpectrum {
    pub fn from_vector(rgb: Vector3f) -> Self {
        Self { rgb }
    }

    pub fn rgb(&self) -> Vector3f {
        self.rgb
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|&v| v == 0.0)
    }

    /// Channel average; the scalar used for importance weights.
    pub fn average(&self) -> Float {
        (self.rgb.x + self.rgb.y + self.rgb.z) / 3.0
    }

    pub fn r(&self) -> Float {
        self.rgb.x
    }

    pub fn g(&self) -> Float {
        self.rgb.y
    }

    pub fn b(&self) -> Float {
        self.rgb.z
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}
