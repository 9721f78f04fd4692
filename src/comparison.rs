/// Policy comparison: runs every policy once per seed over identically built drops and
/// aggregates the per-seed metrics with an arithmetic mean per metric.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::drops::{build_default_drops, DEFAULT_STOCK};
use crate::errors::SimulationError;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::policy::PolicyType;
use crate::simulationrun::{RunMetrics, RunParams, SimulationRun, RUN_METRICS_FIELDS};
use crate::utils::mean;

/// Seeds to run: one seed or a half-open range of seeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seeds {
    Single(u64),
    Range(Range<u64>),
}

impl Seeds {
    /// Seeds in ascending order, produced lazily
    pub fn iter(&self) -> impl Iterator<Item = u64> {
        let (single, range) = match self {
            Seeds::Single(seed) => (Some(*seed), 0..0),
            Seeds::Range(range) => (None, range.clone()),
        };
        single.into_iter().chain(range)
    }

    pub fn count(&self) -> u64 {
        match self {
            Seeds::Single(_) => 1,
            Seeds::Range(range) => range.end.saturating_sub(range.start),
        }
    }
}

impl From<u64> for Seeds {
    fn from(seed: u64) -> Self {
        Seeds::Single(seed)
    }
}

impl From<Range<u64>> for Seeds {
    fn from(range: Range<u64>) -> Self {
        Seeds::Range(range)
    }
}

/// Everything needed to build and run a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    pub users: u64,
    pub horizon_s: u64,
    pub num_drops: usize,
    pub stock: u64,
    pub seeds: Seeds,
}

impl ComparisonConfig {
    /// Configuration with the default stock per drop; drops live for the whole horizon
    pub fn new(users: u64, horizon_s: u64, num_drops: usize, seeds: impl Into<Seeds>) -> Self {
        Self {
            users,
            horizon_s,
            num_drops,
            stock: DEFAULT_STOCK,
            seeds: seeds.into(),
        }
    }

    /// Reject configurations that cannot produce a meaningful comparison
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.users == 0 {
            return Err(SimulationError::invalid("users", "must be greater than zero"));
        }
        if self.horizon_s == 0 {
            return Err(SimulationError::invalid("horizon_s", "must be greater than zero"));
        }
        if self.num_drops == 0 {
            return Err(SimulationError::invalid("k", "at least one drop is required"));
        }
        if self.seeds.count() == 0 {
            return Err(SimulationError::invalid("seeds", "seed range is empty"));
        }
        Ok(())
    }
}

/// Mean of each RunMetrics field over several runs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanMetrics {
    pub runs: usize,
    pub views: f64,
    pub tokens: f64,
    pub redemptions: f64,
    pub ctr: f64,
    pub conversion_given_token: f64,
    pub utilization_stock: f64,
}

impl MeanMetrics {
    /// Average every metric independently (ratios are averaged, not re-derived from sums)
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a RunMetrics>) -> Self {
        let runs: Vec<&RunMetrics> = runs.into_iter().collect();
        let column = |f: fn(&RunMetrics) -> f64| -> f64 {
            let values: Vec<f64> = runs.iter().map(|m| f(m)).collect();
            mean(&values)
        };
        Self {
            runs: runs.len(),
            views: column(|m| m.views as f64),
            tokens: column(|m| m.tokens as f64),
            redemptions: column(|m| m.redemptions as f64),
            ctr: column(|m| m.ctr),
            conversion_given_token: column(|m| m.conversion_given_token),
            utilization_stock: column(|m| m.utilization_stock),
        }
    }
}

/// One (seed, policy) row of a comparison, in export order
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub seed: u64,
    pub policy: String,
    pub metrics: RunMetrics,
}

/// Result of a comparison: policy name -> seed -> metrics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comparison {
    pub results: BTreeMap<String, BTreeMap<u64, RunMetrics>>,
}

impl Comparison {
    pub fn policy_results(&self, policy_type: PolicyType) -> Option<&BTreeMap<u64, RunMetrics>> {
        self.results.get(policy_type.name())
    }

    /// Mean metrics of one policy across all its seeds (all zero if the policy was not run)
    pub fn mean(&self, policy_type: PolicyType) -> MeanMetrics {
        self.policy_results(policy_type)
            .map(|per_seed| MeanMetrics::from_runs(per_seed.values()))
            .unwrap_or_default()
    }

    /// CTR uplift of Thompson over Random in percent, None if Random's mean CTR is zero
    pub fn ctr_uplift(&self) -> Option<f64> {
        let random_ctr = self.mean(PolicyType::RANDOM).ctr;
        if random_ctr > 0.0 {
            Some((self.mean(PolicyType::THOMPSON).ctr / random_ctr - 1.0) * 100.0)
        } else {
            None
        }
    }

    /// Rows ordered by seed, then by policy name
    pub fn rows(&self) -> Vec<ComparisonRow> {
        let mut rows: Vec<ComparisonRow> = self.results
            .iter()
            .flat_map(|(policy, per_seed)| {
                per_seed.iter().map(move |(&seed, &metrics)| ComparisonRow {
                    seed,
                    policy: policy.clone(),
                    metrics,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.seed.cmp(&b.seed).then_with(|| a.policy.cmp(&b.policy)));
        rows
    }

    /// Output the per-policy means and the CTR uplift
    pub fn printout(&self, logger: &mut Logger) {
        for policy_type in PolicyType::ALL {
            let m = self.mean(policy_type);
            logln!(logger, LogEvent::Comparison,
                "{:9} | CTR={:.4} | conv_given_token={:.4} | util_stock={:.4} | tokens={:.1} | views={:.1}",
                policy_type.name(), m.ctr, m.conversion_given_token, m.utilization_stock, m.tokens, m.views);
        }
        logln!(logger, LogEvent::Comparison, "{}", "-".repeat(64));
        match self.ctr_uplift() {
            Some(uplift) => logln!(logger, LogEvent::Comparison, "Uplift CTR (Thompson vs Random): {:.2}%", uplift),
            None => logln!(logger, LogEvent::Comparison, "Uplift CTR (Thompson vs Random): n/a (random CTR is zero)"),
        }
    }

    /// Header matching `rows()`: seed, policy, then the RunMetrics fields
    pub fn header() -> Vec<&'static str> {
        let mut header = vec!["seed", "policy"];
        header.extend(RUN_METRICS_FIELDS);
        header
    }
}

/// Run every policy for every seed described by `config`
/// Each (seed, policy) pair gets its own drops, policy and random source
pub fn compare_with(config: &ComparisonConfig, logger: &mut Logger) -> Result<Comparison, SimulationError> {
    config.validate()?;

    let mut comparison = Comparison::default();
    for seed in config.seeds.iter() {
        for policy_type in PolicyType::ALL {
            let drops = build_default_drops(config.num_drops, config.stock, config.horizon_s);
            let params = RunParams::new(config.users, config.horizon_s, seed);
            let run = SimulationRun::new(drops, policy_type, params, logger)?;
            comparison.results
                .entry(policy_type.name().to_string())
                .or_default()
                .insert(seed, run.metrics);
        }
    }
    Ok(comparison)
}

/// Compare Random and Thompson on the default drop catalog
///
/// # Arguments
/// * `users` - User arrivals per run
/// * `horizon_s` - Arrival horizon, also the lifetime of every drop
/// * `k` - Number of drops
/// * `seeds` - A single seed or a range of seeds, `u64` and `Range<u64>` convert into `Seeds`
pub fn compare(users: u64, horizon_s: u64, k: usize, seeds: impl Into<Seeds>) -> Result<Comparison, SimulationError> {
    let mut logger = Logger::new();
    compare_with(&ComparisonConfig::new(users, horizon_s, k, seeds), &mut logger)
}
