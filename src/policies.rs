use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::errors::SimulationError;
use crate::policy::SelectionPolicyTrait;

/// Uniform random selection, stateless
pub struct PolicyUniformRandom;

impl SelectionPolicyTrait for PolicyUniformRandom {
    fn choose(&mut self, eligible: &[usize], rng: &mut StdRng) -> Result<usize, SimulationError> {
        if eligible.is_empty() {
            return Err(SimulationError::NoEligibleDrops);
        }
        Ok(eligible[rng.gen_range(0..eligible.len())])
    }

    fn observe(&mut self, _index: usize, _success: bool) {}

    fn policy_state_string(&self) -> String {
        "Uniform random".to_string()
    }
}

/// Beta posterior for one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaPosterior {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaPosterior {
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}

impl Default for BetaPosterior {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 1.0 }
    }
}

/// Thompson sampling over independent Beta-Bernoulli arms
/// One posterior per global drop index, starting from the uniform prior Beta(1, 1)
pub struct PolicyThompsonBeta {
    pub posteriors: Vec<BetaPosterior>,
}

impl PolicyThompsonBeta {
    pub fn new(num_arms: usize) -> Self {
        Self {
            posteriors: vec![BetaPosterior::default(); num_arms],
        }
    }

    fn sample(posterior: &BetaPosterior, rng: &mut StdRng) -> f64 {
        // Parameters start at 1.0 and only grow, so construction cannot fail in practice
        match Beta::new(posterior.alpha, posterior.beta) {
            Ok(dist) => dist.sample(rng),
            Err(_) => posterior.mean(),
        }
    }
}

impl SelectionPolicyTrait for PolicyThompsonBeta {
    fn choose(&mut self, eligible: &[usize], rng: &mut StdRng) -> Result<usize, SimulationError> {
        let mut best: Option<(usize, f64)> = None;
        for &index in eligible {
            let sample = Self::sample(&self.posteriors[index], rng);
            // Strict comparison: ties go to the first maximal sample in iteration order
            match best {
                Some((_, best_sample)) if sample <= best_sample => {}
                _ => best = Some((index, sample)),
            }
        }
        best.map(|(index, _)| index).ok_or(SimulationError::NoEligibleDrops)
    }

    fn observe(&mut self, index: usize, success: bool) {
        let posterior = &mut self.posteriors[index];
        if success {
            posterior.alpha += 1.0;
        } else {
            posterior.beta += 1.0;
        }
    }

    fn policy_state_string(&self) -> String {
        let arms: Vec<String> = self.posteriors
            .iter()
            .enumerate()
            .map(|(index, p)| format!("#{} a={:.0} b={:.0} mean={:.4}", index, p.alpha, p.beta, p.mean()))
            .collect();
        format!("Thompson Beta-Bernoulli [{}]", arms.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_random_returns_member_of_eligible() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut policy = PolicyUniformRandom;
        let eligible = vec![1, 4, 6];
        for _ in 0..200 {
            let index = policy.choose(&eligible, &mut rng).unwrap();
            assert!(eligible.contains(&index));
        }
    }

    #[test]
    fn test_uniform_random_reaches_every_eligible_arm() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut policy = PolicyUniformRandom;
        let eligible = vec![0, 2, 3];
        let mut seen = [false; 4];
        for _ in 0..300 {
            seen[policy.choose(&eligible, &mut rng).unwrap()] = true;
        }
        assert_eq!(seen, [true, false, true, true]);
    }

    #[test]
    fn test_empty_eligible_set_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(PolicyUniformRandom.choose(&[], &mut rng), Err(SimulationError::NoEligibleDrops)));
        let mut thompson = PolicyThompsonBeta::new(3);
        assert!(matches!(thompson.choose(&[], &mut rng), Err(SimulationError::NoEligibleDrops)));
    }

    #[test]
    fn test_thompson_starts_from_uniform_prior() {
        let policy = PolicyThompsonBeta::new(4);
        assert_eq!(policy.posteriors.len(), 4);
        assert!(policy.posteriors.iter().all(|p| p.alpha == 1.0 && p.beta == 1.0));
    }

    #[test]
    fn test_thompson_observe_updates_only_the_observed_arm() {
        let mut policy = PolicyThompsonBeta::new(3);
        policy.observe(1, true);
        policy.observe(1, false);
        policy.observe(1, true);
        assert_eq!(policy.posteriors[1], BetaPosterior { alpha: 3.0, beta: 2.0 });
        assert_eq!(policy.posteriors[0], BetaPosterior::default());
        assert_eq!(policy.posteriors[2], BetaPosterior::default());
    }

    #[test]
    fn test_thompson_only_picks_eligible_arms() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut policy = PolicyThompsonBeta::new(5);
        // Arm 0 looks great but is not eligible
        for _ in 0..100 {
            policy.observe(0, true);
        }
        for _ in 0..100 {
            let index = policy.choose(&[2, 4], &mut rng).unwrap();
            assert!(index == 2 || index == 4);
        }
    }

    #[test]
    fn test_thompson_exploits_a_clearly_better_arm() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut policy = PolicyThompsonBeta::new(2);
        for _ in 0..200 {
            policy.observe(0, false);
            policy.observe(1, true);
        }
        let picks_of_one = (0..100)
            .filter(|_| policy.choose(&[0, 1], &mut rng).unwrap() == 1)
            .count();
        assert_eq!(picks_of_one, 100);
    }

    #[test]
    fn test_thompson_is_deterministic_for_same_seed_and_state() {
        let eligible = vec![0, 1, 2];
        let mut a = PolicyThompsonBeta::new(3);
        let mut b = PolicyThompsonBeta::new(3);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        for step in 0..50 {
            let index_a = a.choose(&eligible, &mut rng_a).unwrap();
            let index_b = b.choose(&eligible, &mut rng_b).unwrap();
            assert_eq!(index_a, index_b);
            a.observe(index_a, step % 3 == 0);
            b.observe(index_b, step % 3 == 0);
        }
    }

    #[test]
    fn test_state_string_lists_every_arm() {
        let mut policy = PolicyThompsonBeta::new(2);
        policy.observe(0, true);
        let s = policy.policy_state_string();
        assert!(s.contains("#0 a=2 b=1"));
        assert!(s.contains("#1 a=1 b=1"));
    }
}
