/// Conversion model: how the time left on a drop changes the chance a user converts
///
/// The urgency multiplier grows linearly as the deadline approaches:
///     m = 1 + urgency_k * (1 - t_remaining / total)
/// and is clamped to [min_multiplier, max_multiplier] so the effect stays bounded whatever
/// urgency_k is. The effective probability is base_p * m clamped to [0, 1].

pub const DEFAULT_URGENCY_K: f64 = 1.25;
pub const MIN_URGENCY_MULTIPLIER: f64 = 0.2;
pub const MAX_URGENCY_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionModel {
    pub urgency_k: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

impl ConversionModel {
    /// Create a model with a custom urgency curvature and the default clamp bounds
    pub fn new(urgency_k: f64) -> Self {
        Self {
            urgency_k,
            ..Self::default()
        }
    }

    /// Urgency multiplier for a drop with `t_remaining` seconds left out of `total`
    /// Returns exactly 1.0 when `total` is not positive (no urgency effect)
    pub fn urgency_multiplier(&self, t_remaining: f64, total: f64) -> f64 {
        if total <= 0.0 {
            return 1.0;
        }
        let x = (t_remaining / total).clamp(0.0, 1.0);
        let multiplier = 1.0 + self.urgency_k * (1.0 - x);
        multiplier.clamp(self.min_multiplier, self.max_multiplier)
    }

    /// Probability that a user converts on a drop with intrinsic probability `base_p`
    pub fn effective_probability(&self, base_p: f64, t_remaining: f64, total: f64) -> f64 {
        (base_p * self.urgency_multiplier(t_remaining, total)).clamp(0.0, 1.0)
    }
}

impl Default for ConversionModel {
    fn default() -> Self {
        Self {
            urgency_k: DEFAULT_URGENCY_K,
            min_multiplier: MIN_URGENCY_MULTIPLIER,
            max_multiplier: MAX_URGENCY_MULTIPLIER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_multiplier_is_one_at_start_and_peaks_at_expiry() {
        let model = ConversionModel::default();
        assert!((model.urgency_multiplier(900.0, 900.0) - 1.0).abs() < EPS);
        assert!((model.urgency_multiplier(0.0, 900.0) - 2.0).abs() < EPS);
        // Halfway: 1 + 1.25 * 0.5
        assert!((model.urgency_multiplier(450.0, 900.0) - 1.625).abs() < EPS);
    }

    #[test]
    fn test_non_positive_total_disables_urgency() {
        let model = ConversionModel::default();
        assert_eq!(model.urgency_multiplier(10.0, 0.0), 1.0);
        assert_eq!(model.urgency_multiplier(10.0, -5.0), 1.0);
        assert!((model.effective_probability(0.1, 10.0, 0.0) - 0.1).abs() < EPS);
    }

    #[test]
    fn test_remaining_time_beyond_total_is_clamped() {
        let model = ConversionModel::default();
        assert!((model.urgency_multiplier(5000.0, 900.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_curvature_is_bounded_by_clamp() {
        let steep = ConversionModel::new(10.0);
        assert_eq!(steep.urgency_multiplier(0.0, 100.0), MAX_URGENCY_MULTIPLIER);
        let negative = ConversionModel::new(-10.0);
        assert_eq!(negative.urgency_multiplier(0.0, 100.0), MIN_URGENCY_MULTIPLIER);
    }

    #[test]
    fn test_effective_probability_never_exceeds_one() {
        let model = ConversionModel::default();
        assert_eq!(model.effective_probability(0.8, 0.0, 900.0), 1.0);
        assert_eq!(model.effective_probability(0.0, 0.0, 900.0), 0.0);
    }

    proptest! {
        #[test]
        fn more_time_left_never_raises_probability(
            base_p in 0.0f64..=1.0,
            total in 1u64..10_000,
            a in 0u64..20_000,
            b in 0u64..20_000,
        ) {
            let model = ConversionModel::default();
            let (less, more) = if a <= b { (a, b) } else { (b, a) };
            let p_less = model.effective_probability(base_p, less as f64, total as f64);
            let p_more = model.effective_probability(base_p, more as f64, total as f64);
            prop_assert!(p_more <= p_less);
        }

        #[test]
        fn probability_stays_within_urgency_bounds(
            base_p in 0.0f64..=1.0,
            total in 1u64..10_000,
            t_remaining in 0u64..20_000,
        ) {
            let model = ConversionModel::default();
            let p = model.effective_probability(base_p, t_remaining as f64, total as f64);
            prop_assert!(p >= 0.0);
            prop_assert!(p <= (base_p * MAX_URGENCY_MULTIPLIER).min(1.0) + EPS);
        }
    }
}
