use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;

use crate::errors::SimulationError;
use crate::policies::{PolicyThompsonBeta, PolicyUniformRandom};

/// Trait for arm-selection policies used by the simulation loop
///
/// Arms are identified by their global index in `Drops`, never by their position inside
/// the eligible subset, so stateful policies can key their beliefs by index.
pub trait SelectionPolicyTrait {
    /// Choose one of `eligible` (non-empty, ordered global drop indices)
    /// Randomness comes exclusively from the run-owned `rng`
    fn choose(&mut self, eligible: &[usize], rng: &mut StdRng) -> Result<usize, SimulationError>;

    /// Learn from the outcome of offering drop `index`
    /// Only called for an index that was just chosen and evaluated
    fn observe(&mut self, index: usize, success: bool);

    /// Short string describing the policy and its current state
    fn policy_state_string(&self) -> String;
}

/// Policy type selecting which `SelectionPolicyTrait` implementation a run uses
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyType {
    RANDOM,
    THOMPSON,
}

impl PolicyType {
    /// Every policy compared by the comparison runner, in output order
    pub const ALL: [PolicyType; 2] = [PolicyType::RANDOM, PolicyType::THOMPSON];

    /// Identifier used on the command line, in CSV rows and as comparison key
    pub fn name(&self) -> &'static str {
        match self {
            PolicyType::RANDOM => "random",
            PolicyType::THOMPSON => "thompson",
        }
    }

    /// Create a fresh policy instance for a run over `num_arms` drops
    pub fn create_policy(&self, num_arms: usize) -> Box<dyn SelectionPolicyTrait> {
        match self {
            PolicyType::RANDOM => Box::new(PolicyUniformRandom),
            PolicyType::THOMPSON => Box::new(PolicyThompsonBeta::new(num_arms)),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PolicyType {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(PolicyType::RANDOM),
            "thompson" => Ok(PolicyType::THOMPSON),
            other => Err(SimulationError::UnsupportedPolicy(other.to_string())),
        }
    }
}
