use rand::{rngs::StdRng, SeedableRng};
use std::sync::atomic::AtomicU64;

/// Total number of simulation runs executed by this process (reported by the CLI)
pub static TOTAL_SIMULATION_RUNS: AtomicU64 = AtomicU64::new(0);

/// Fresh random source for one run, each run owns its own instance
pub fn rng_for_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Ratio that degrades to 0.0 instead of dividing by zero
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    ratio_or_zero(values.iter().sum::<f64>(), values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_ratio_or_zero() {
        assert_eq!(ratio_or_zero(3.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(0.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(3.0, 4.0), 0.75);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn test_rng_for_seed_is_reproducible() {
        let mut rng_a = rng_for_seed(42);
        let mut rng_b = rng_for_seed(42);
        let a: Vec<u64> = (0..5).map(|_| rng_a.gen()).collect();
        let b: Vec<u64> = (0..5).map(|_| rng_b.gen()).collect();
        assert_eq!(a, b);
    }
}
