//! Summary statistics over simulation output

/// Streaming mean/variance (Welford's algorithm).
///
/// Constant input yields a mean equal to that constant and exactly zero
/// variance, with no rounding residue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with a new observation
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (divides by n)
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }

    /// Population standard deviation
    pub fn population_stddev(&self) -> f64 {
        self.population_variance().sqrt()
    }
}

/// Percentile of ascending-sorted data by linear interpolation.
///
/// The rank is `p * (n - 1)`; when it is integral the sample at that index
/// is returned as-is, otherwise the value is interpolated between the lower
/// and upper neighbours. Returns `None` for empty input or `p` outside [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    let value = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    // Rounding must not push the value past its upper neighbour
    Some(value.clamp(sorted[lo], sorted[hi]))
}
