//! Sampling from variable distributions

use rand::Rng;

use crate::entities::variable::{Distribution, ValueSource};

impl Distribution {
    /// Draw one value
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Distribution::Uniform { min, max } => {
                // Linear scaling of U[0, 1) keeps samples in [min, max)
                let u: f64 = rng.random();
                min + (max - min) * u
            }
            Distribution::Normal { mean, stddev } => {
                // Box-Muller; u1 taken from (0, 1] so ln(u1) stays finite
                let u1: f64 = 1.0 - rng.random::<f64>();
                let u2: f64 = rng.random();
                let z = (-2.0_f64 * u1.ln()).sqrt() * (2.0_f64 * std::f64::consts::PI * u2).cos();
                mean + stddev * z
            }
            Distribution::Triangular { min, mode, max } => {
                let range = max - min;
                if range <= 0.0 {
                    return min;
                }
                // Inverse CDF
                let u: f64 = rng.random();
                let fc = (mode - min) / range;
                if u < fc {
                    min + (u * range * (mode - min)).sqrt()
                } else {
                    max - ((1.0 - u) * range * (max - mode)).sqrt()
                }
            }
        }
    }
}

impl ValueSource {
    /// Value for one iteration
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ValueSource::Fixed(value) => *value,
            ValueSource::Random(distribution) => distribution.sample(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn draws(dist: Distribution, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_uniform_stays_in_half_open_range() {
        let samples = draws(Distribution::Uniform { min: 1.0, max: 2.0 }, 10_000);
        assert!(samples.iter().all(|&x| (1.0..2.0).contains(&x)));
        assert!((mean(&samples) - 1.5).abs() < 0.02);
    }

    #[test]
    fn test_normal_moments() {
        let samples = draws(
            Distribution::Normal {
                mean: 10.0,
                stddev: 2.0,
            },
            20_000,
        );
        let m = mean(&samples);
        let var = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(samples.iter().all(|x| x.is_finite()));
        assert!((m - 10.0).abs() < 0.1, "mean {}", m);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "stddev {}", var.sqrt());
    }

    #[test]
    fn test_triangular_bounds_and_mean() {
        let dist = Distribution::Triangular {
            min: 0.0,
            mode: 1.0,
            max: 4.0,
        };
        let samples = draws(dist, 20_000);
        assert!(samples.iter().all(|&x| (0.0..=4.0).contains(&x)));
        assert!((mean(&samples) - dist.expected_value()).abs() < 0.05);
    }

    #[test]
    fn test_degenerate_distributions() {
        let mut rng = StdRng::seed_from_u64(1);
        let tri = Distribution::Triangular {
            min: 2.0,
            mode: 2.0,
            max: 2.0,
        };
        assert_eq!(tri.sample(&mut rng), 2.0);
        let uni = Distribution::Uniform { min: 3.0, max: 3.0 };
        assert_eq!(uni.sample(&mut rng), 3.0);
        let normal = Distribution::Normal {
            mean: 4.0,
            stddev: 0.0,
        };
        assert_eq!(normal.sample(&mut rng), 4.0);
    }

    #[test]
    fn test_fixed_source_ignores_rng() {
        let mut rng = StdRng::seed_from_u64(9);
        let source = ValueSource::Fixed(7.5);
        assert!((0..100).all(|_| source.draw(&mut rng) == 7.5));
    }
}
