// Copyright @yucwang 2026

use super::constants::{ Float, Vector2f, ONE_MINUS_EPSILON };

/// Result of inverting a piecewise-constant CDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionSample {
    pub index: usize,
    /// Position inside the selected bucket, in [0, 1).
    pub offset: Float,
    /// Density with respect to the unit interval.
    pub pdf: Float,
}

/// Piecewise-constant distribution over [0, 1) built from bucket weights.
///
/// The CDF holds `count + 1` entries with `cdf[0] == 0` and, unless the
/// distribution is degenerate, `cdf[count] == 1`. A degenerate distribution
/// (all weights zero) keeps a uniform CDF so that sampling still yields a
/// valid coordinate, but every density it reports is zero.
#[derive(Debug, Clone)]
pub struct PiecewiseDistribution1D {
    func: Vec<Float>,
    cdf: Vec<Float>,
    func_sum: Float,
}

impl PiecewiseDistribution1D {
    pub fn new(weights: &[Float]) -> Self {
        let n = weights.len();
        let mut rejected = 0usize;
        let func: Vec<Float> = weights
            .iter()
            .map(|&w| {
                if w.is_finite() && w >= 0.0 {
                    w
                } else {
                    rejected += 1;
                    0.0
                }
            })
            .collect();
        if rejected > 0 {
            log::warn!("Distribution: {} of {} weights were negative or non-finite and were zeroed.",
                       rejected, n);
        }

        let mut cdf = vec![0.0; n + 1];
        // Accumulate in f64 so long rows do not drift away from 1.
        let mut running = 0.0f64;
        for i in 0..n {
            running += func[i] as f64;
            cdf[i + 1] = running as Float;
        }
        let func_sum = running as Float;

        if func_sum > 0.0 {
            let mut acc = 0.0f64;
            for i in 0..n {
                acc += func[i] as f64;
                cdf[i + 1] = (acc / running) as Float;
            }
            cdf[n] = 1.0;
        } else if n > 0 {
            for i in 1..(n + 1) {
                cdf[i] = (i as Float) / (n as Float);
            }
        }

        Self { func, cdf, func_sum }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.func_sum > 0.0)
    }

    /// Sum of all bucket weights.
    pub fn total_weight(&self) -> Float {
        self.func_sum
    }

    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Finds the bucket with `cdf[i] <= u < cdf[i + 1]`. Zero-width buckets
    /// are never selected because the search lands past runs of equal values.
    fn find_interval(&self, u: Float) -> usize {
        let n = self.count();
        let first_above = self.cdf.partition_point(|&c| c <= u);
        first_above.saturating_sub(1).min(n.saturating_sub(1))
    }

    pub fn sample(&self, u: Float) -> DistributionSample {
        if self.count() == 0 {
            return DistributionSample { index: 0, offset: 0.0, pdf: 0.0 };
        }

        let u = u.max(0.0).min(ONE_MINUS_EPSILON);
        let index = self.find_interval(u);
        let cdf0 = self.cdf[index];
        let span = self.cdf[index + 1] - cdf0;
        let offset = if span > 0.0 {
            ((u - cdf0) / span).min(ONE_MINUS_EPSILON)
        } else {
            0.0
        };

        DistributionSample { index, offset, pdf: self.bucket_pdf(index) }
    }

    /// Density of the bucket containing `x`; zero outside [0, 1).
    pub fn pdf(&self, x: Float) -> Float {
        if !(x >= 0.0 && x < 1.0) || self.count() == 0 {
            return 0.0;
        }
        let index = ((x * self.count() as Float) as usize).min(self.count() - 1);
        self.bucket_pdf(index)
    }

    /// Continuous density of a bucket: weight / total / bucket width.
    pub fn bucket_pdf(&self, index: usize) -> Float {
        if self.is_degenerate() || index >= self.count() {
            return 0.0;
        }
        self.func[index] * self.count() as Float / self.func_sum
    }

    /// Probability mass of choosing bucket `index`.
    pub fn discrete_pmf(&self, index: usize) -> Float {
        if self.is_degenerate() || index >= self.count() {
            return 0.0;
        }
        self.func[index] / self.func_sum
    }
}

/// Maps a bucket offset back to [0, 1) so that `(x * count) as usize`
/// recovers `index`. Offsets a few ulps below one can otherwise round onto
/// the lower edge of the next bucket.
fn coordinate_in_bucket(index: usize, offset: Float, count: usize) -> Float {
    let n = count as Float;
    let mut x = ((index as Float + offset) / n).min(ONE_MINUS_EPSILON);
    while x > 0.0 && (x * n) as usize > index {
        x = Float::from_bits(x.to_bits() - 1);
    }
    while x < ONE_MINUS_EPSILON && ((x * n) as usize) < index {
        x = Float::from_bits(x.to_bits() + 1);
    }
    x
}

/// Separable 2D distribution: one conditional per row plus a marginal over
/// row sums.
#[derive(Debug, Clone)]
pub struct PiecewiseDistribution2D {
    conditionals: Vec<PiecewiseDistribution1D>,
    marginal: PiecewiseDistribution1D,
    width: usize,
    height: usize,
}

impl PiecewiseDistribution2D {
    /// `weights` is row-major with `height` rows of `width` entries.
    pub fn new(weights: &[Float], width: usize, height: usize) -> Self {
        assert_eq!(weights.len(), width * height,
                   "weight grid does not match {}x{}", width, height);

        let conditionals: Vec<PiecewiseDistribution1D> = weights
            .chunks(width.max(1))
            .take(height)
            .map(PiecewiseDistribution1D::new)
            .collect();
        let row_sums: Vec<Float> = conditionals.iter().map(|row| row.total_weight()).collect();
        let marginal = PiecewiseDistribution1D::new(&row_sums);

        log::debug!("Built 2D distribution {}x{}, total weight {}.",
                    width, height, marginal.total_weight());

        Self { conditionals, marginal, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.marginal.is_degenerate()
    }

    /// Samples `(x, y)` in [0, 1)^2; `u.x` picks the column, `u.y` the row.
    pub fn sample(&self, u: &Vector2f) -> (Vector2f, Float) {
        if self.width == 0 || self.height == 0 {
            return (Vector2f::zeros(), 0.0);
        }

        let row = self.marginal.sample(u.y);
        let col = self.conditionals[row.index].sample(u.x);
        let uv = Vector2f::new(
            coordinate_in_bucket(col.index, col.offset, self.width),
            coordinate_in_bucket(row.index, row.offset, self.height),
        );
        (uv, row.pdf * col.pdf)
    }

    pub fn pdf(&self, uv: &Vector2f) -> Float {
        if !(uv.x >= 0.0 && uv.x < 1.0 && uv.y >= 0.0 && uv.y < 1.0) {
            return 0.0;
        }
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let row = ((uv.y * self.height as Float) as usize).min(self.height - 1);
        self.marginal.bucket_pdf(row) * self.conditionals[row].pdf(uv.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn chi_squared(observed: &[usize], expected: &[Float]) -> Float {
        observed
            .iter()
            .zip(expected.iter())
            .filter(|(_, &e)| e > 0.0)
            .map(|(&o, &e)| {
                let d = o as Float - e;
                d * d / e
            })
            .sum()
    }

    #[test]
    fn test_cdf_invariants() {
        let d = PiecewiseDistribution1D::new(&[1.0, 0.0, 3.0, 4.0]);
        let cdf = d.cdf();
        assert_eq!(cdf.len(), 5);
        assert_eq!(cdf[0], 0.0);
        assert_eq!(cdf[4], 1.0);
        for i in 0..4 {
            assert!(cdf[i] <= cdf[i + 1]);
        }
        assert!(!d.is_degenerate());
    }

    #[test]
    fn test_sample_matches_weights_chi_squared() {
        let weights = [1.0, 5.0, 0.0, 2.0, 8.0, 4.0];
        let d = PiecewiseDistribution1D::new(&weights);
        let total: Float = weights.iter().sum();

        let n = 100_000usize;
        let mut counts = vec![0usize; weights.len()];
        let mut rng = LcgRng::new(42);
        for _ in 0..n {
            let s = d.sample(rng.next_f32());
            assert!(s.offset >= 0.0 && s.offset < 1.0);
            counts[s.index] += 1;
        }
        assert_eq!(counts[2], 0);

        let expected: Vec<Float> = weights.iter().map(|w| w / total * n as Float).collect();
        // Four degrees of freedom (five non-zero buckets), p = 0.001 critical value.
        assert!(chi_squared(&counts, &expected) < 18.47);
    }

    #[test]
    fn test_pdf_integrates_to_one() {
        let d = PiecewiseDistribution1D::new(&[0.5, 2.0, 0.0, 7.5, 1.0, 3.0, 0.25]);
        let steps = 7000;
        let integral: Float = (0..steps)
            .map(|i| d.pdf((i as Float + 0.5) / steps as Float))
            .sum::<Float>() / steps as Float;
        assert!((integral - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_pdf_agrees_with_lookup() {
        let d = PiecewiseDistribution1D::new(&[3.0, 1.0, 6.0]);
        let mut rng = LcgRng::new(3);
        for _ in 0..1000 {
            let s = d.sample(rng.next_f32());
            let x = (s.index as Float + s.offset) / d.count() as Float;
            assert!((d.pdf(x) - s.pdf).abs() <= 1e-5 * s.pdf);
        }
    }

    #[test]
    fn test_sample_is_monotonic() {
        let d = PiecewiseDistribution1D::new(&[2.0, 0.0, 1.0, 0.0, 0.0, 4.0]);
        let mut last = -1.0;
        for i in 0..10_000 {
            let u = i as Float / 10_000.0;
            let s = d.sample(u);
            let x = s.index as Float + s.offset;
            assert!(x >= last);
            last = x;
        }
    }

    #[test]
    fn test_single_nonzero_bucket_always_selected() {
        let d = PiecewiseDistribution1D::new(&[0.0, 0.0, 5.0, 0.0]);
        for &u in [0.0, 0.25, 0.5, 0.75, 0.999_999].iter() {
            let s = d.sample(u);
            assert_eq!(s.index, 2);
            assert!((s.pdf - 4.0).abs() < 1e-6);
        }
        assert_eq!(d.discrete_pmf(2), 1.0);
    }

    #[test]
    fn test_degenerate_distribution_has_zero_density() {
        let d = PiecewiseDistribution1D::new(&[0.0, 0.0, 0.0]);
        assert!(d.is_degenerate());
        let s = d.sample(0.4);
        assert_eq!(s.pdf, 0.0);
        assert_eq!(d.pdf(0.4), 0.0);
        assert_eq!(d.discrete_pmf(1), 0.0);

        let empty = PiecewiseDistribution1D::new(&[]);
        assert_eq!(empty.sample(0.3).pdf, 0.0);
        assert_eq!(empty.pdf(0.3), 0.0);
    }

    #[test]
    fn test_pdf_outside_domain_is_zero() {
        let d = PiecewiseDistribution1D::new(&[1.0, 2.0]);
        assert_eq!(d.pdf(-0.1), 0.0);
        assert_eq!(d.pdf(1.0), 0.0);
        assert_eq!(d.pdf(Float::NAN), 0.0);
    }

    #[test]
    fn test_invalid_weights_are_zeroed() {
        let d = PiecewiseDistribution1D::new(&[1.0, -2.0, Float::NAN, 1.0]);
        assert_eq!(d.total_weight(), 2.0);
        assert_eq!(d.discrete_pmf(1), 0.0);
        assert_eq!(d.discrete_pmf(2), 0.0);
        assert_eq!(d.discrete_pmf(3), 0.5);
    }

    #[test]
    fn test_uniform_2x2_grid_has_unit_density() {
        let d = PiecewiseDistribution2D::new(&[1.0, 1.0, 1.0, 1.0], 2, 2);
        let mut rng = LcgRng::new(5);
        for _ in 0..100 {
            let uv = Vector2f::new(rng.next_f32(), rng.next_f32());
            assert!((d.pdf(&uv) - 1.0).abs() < 1e-6);
            let (_, pdf) = d.sample(&uv);
            assert!((pdf - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_2d_sample_matches_pdf() {
        let (w, h) = (7, 5);
        let weights: Vec<Float> = (0..w * h).map(|i| ((i * 37) % 11) as Float).collect();
        let d = PiecewiseDistribution2D::new(&weights, w, h);
        let mut rng = LcgRng::new(17);
        for _ in 0..5000 {
            let (uv, pdf) = d.sample(&Vector2f::new(rng.next_f32(), rng.next_f32()));
            assert!(pdf > 0.0);
            assert!(uv.x >= 0.0 && uv.x < 1.0 && uv.y >= 0.0 && uv.y < 1.0);
            let lookup = d.pdf(&uv);
            assert!((lookup - pdf).abs() <= 1e-5 * pdf);
        }
    }

    #[test]
    fn test_2d_sample_just_below_bucket_edges() {
        // Every other column is empty, so landing one bucket over shows up
        // as a zero lookup.
        let (w, h) = (7, 5);
        let weights: Vec<Float> = (0..w * h)
            .map(|i| if (i % w) % 2 == 0 { 1.0 + (i / w) as Float + (i % w) as Float } else { 0.0 })
            .collect();
        let d = PiecewiseDistribution2D::new(&weights, w, h);

        let below = |c: Float, steps: u32| -> Vec<Float> {
            let mut out = Vec::new();
            let mut v = c;
            for _ in 0..steps {
                if v <= 0.0 {
                    break;
                }
                v = Float::from_bits(v.to_bits() - 1);
                out.push(v);
            }
            out
        };

        let mut checked = 0;
        for &cy in d.marginal.cdf().iter().skip(1) {
            for uy in below(cy, 8) {
                let row = d.marginal.sample(uy).index;
                for &cx in d.conditionals[row].cdf().iter().skip(1) {
                    for ux in below(cx, 8) {
                        let (uv, pdf) = d.sample(&Vector2f::new(ux, uy));
                        assert!(pdf > 0.0);
                        assert_eq!((uv.x * w as Float) as usize, d.conditionals[row].sample(ux).index);
                        assert_eq!((uv.y * h as Float) as usize, row);
                        let lookup = d.pdf(&uv);
                        assert!((lookup - pdf).abs() <= 1e-5 * pdf,
                                "u = ({}, {}) -> {:?}: {} vs {}", ux, uy, uv, pdf, lookup);
                        checked += 1;
                    }
                }
            }
        }
        assert!(checked > 200);
    }

    #[test]
    fn test_coordinate_stays_in_bucket() {
        let almost_one = Float::from_bits(1.0f32.to_bits() - 1);
        for count in [3usize, 5, 7, 11] {
            for index in 0..count {
                let x = coordinate_in_bucket(index, almost_one, count);
                assert_eq!((x * count as Float) as usize, index);
                let x = coordinate_in_bucket(index, 0.0, count);
                assert_eq!((x * count as Float) as usize, index);
            }
        }
    }

    #[test]
    fn test_2d_pdf_integrates_to_one() {
        let (w, h) = (6, 4);
        let weights: Vec<Float> = (0..w * h).map(|i| (i % 5) as Float + 0.5).collect();
        let d = PiecewiseDistribution2D::new(&weights, w, h);
        let steps = 240;
        let mut integral = 0.0;
        for j in 0..steps {
            for i in 0..steps {
                let uv = Vector2f::new((i as Float + 0.5) / steps as Float,
                                       (j as Float + 0.5) / steps as Float);
                integral += d.pdf(&uv);
            }
        }
        integral /= (steps * steps) as Float;
        assert!((integral - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_2d_degenerate_grid() {
        let d = PiecewiseDistribution2D::new(&[0.0; 6], 3, 2);
        assert!(d.is_degenerate());
        let (_, pdf) = d.sample(&Vector2f::new(0.3, 0.6));
        assert_eq!(pdf, 0.0);
        assert_eq!(d.pdf(&Vector2f::new(0.3, 0.6)), 0.0);
        assert_eq!(d.pdf(&Vector2f::new(0.3, -0.1)), 0.0);
    }
}
