/// This file contains the SimulationRun struct, which runs one single simulation of a drop feed
/// (one policy, one seed), and RunMetrics, the flat record of its outcome.
///
/// A run is a single ordered pass over user arrivals:
/// - arrival times are drawn uniformly over [0, horizon_s) and sorted
/// - each arrival sees the drops that still have stock and the policy picks one of them
/// - the user converts with the urgency-adjusted probability of the chosen drop
/// - a conversion takes one unit out of stock, and the outcome is fed back to the policy

use rand::Rng;

use crate::conversion::ConversionModel;
use crate::drops::Drops;
use crate::errors::SimulationError;
use crate::logger::{Logger, LogEvent};
use crate::logln;
use crate::policy::PolicyType;
use crate::utils::{ratio_or_zero, rng_for_seed, TOTAL_SIMULATION_RUNS};
use std::sync::atomic::Ordering;

/// Column names of RunMetrics as consumed by exports, in order
pub const RUN_METRICS_FIELDS: [&str; 6] = [
    "views",
    "tokens",
    "redemptions",
    "CTR",
    "conversion_given_token",
    "utilization_stock",
];

/// Outcome of one run
/// Ratios are 0.0 whenever their denominator is 0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunMetrics {
    /// Arrivals that found at least one eligible drop and were shown one
    pub views: u64,
    /// Successful conversions
    pub tokens: u64,
    /// Redemptions, currently every token redeems in the same step
    pub redemptions: u64,
    /// tokens / views (exported as "CTR")
    pub ctr: f64,
    /// redemptions / tokens
    pub conversion_given_token: f64,
    /// sold / initial stock, summed over all drops
    pub utilization_stock: f64,
}

impl RunMetrics {
    /// Derive the ratios from raw counts
    pub fn from_counts(views: u64, tokens: u64, redemptions: u64, total_sold: u64, total_initial_stock: u64) -> Self {
        Self {
            views,
            tokens,
            redemptions,
            ctr: ratio_or_zero(tokens as f64, views as f64),
            conversion_given_token: ratio_or_zero(redemptions as f64, tokens as f64),
            utilization_stock: ratio_or_zero(total_sold as f64, total_initial_stock as f64),
        }
    }

    /// Field values as f64 in `RUN_METRICS_FIELDS` order
    pub fn values(&self) -> [f64; 6] {
        [
            self.views as f64,
            self.tokens as f64,
            self.redemptions as f64,
            self.ctr,
            self.conversion_given_token,
            self.utilization_stock,
        ]
    }

    /// One-line summary used in logs
    pub fn summary_string(&self) -> String {
        format!(
            "views={} tokens={} redemptions={} CTR={:.4} conv_given_token={:.4} util_stock={:.4}",
            self.views, self.tokens, self.redemptions, self.ctr, self.conversion_given_token, self.utilization_stock
        )
    }
}

/// Parameters of a single run that are not part of the drops themselves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub users: u64,
    pub horizon_s: u64,
    pub seed: u64,
    pub conversion_model: ConversionModel,
}

impl RunParams {
    pub fn new(users: u64, horizon_s: u64, seed: u64) -> Self {
        Self {
            users,
            horizon_s,
            seed,
            conversion_model: ConversionModel::default(),
        }
    }
}

/// A completed run: the final drop state, per-drop view counts and the metrics
/// The drops are owned by the run, so nothing leaks into other runs or policies
pub struct SimulationRun {
    pub policy_type: PolicyType,
    pub params: RunParams,
    pub drops: Drops,
    /// Number of times each drop was shown, indexed like `drops`
    pub views_per_drop: Vec<u64>,
    pub metrics: RunMetrics,
    /// Final policy state, for logging
    pub policy_state: String,
}

impl SimulationRun {
    /// Run the simulation for one policy and one seed
    ///
    /// # Arguments
    /// * `drops` - Freshly built drops, consumed by the run
    /// * `policy_type` - Which selection policy to instantiate (fresh state)
    /// * `params` - Users, horizon, seed and conversion model
    /// * `logger` - Logger for run summaries and per-arrival traces
    ///
    /// `users == 0` or `horizon_s == 0` is a degenerate run with all metrics at zero
    pub fn new(mut drops: Drops, policy_type: PolicyType, params: RunParams, logger: &mut Logger) -> Result<Self, SimulationError> {
        TOTAL_SIMULATION_RUNS.fetch_add(1, Ordering::Relaxed);

        let mut rng = rng_for_seed(params.seed);
        let mut policy = policy_type.create_policy(drops.len());
        let mut views_per_drop = vec![0u64; drops.len()];
        let mut views = 0u64;
        let mut tokens = 0u64;
        let mut redemptions = 0u64;

        let arrivals: Vec<u64> = if params.users == 0 || params.horizon_s == 0 {
            Vec::new()
        } else {
            let mut arrivals: Vec<u64> = (0..params.users)
                .map(|_| rng.gen_range(0..params.horizon_s))
                .collect();
            arrivals.sort_unstable();
            arrivals
        };

        let trace = logger.is_enabled(LogEvent::Arrival);

        for t in arrivals {
            let eligible = drops.eligible_indices();
            if eligible.is_empty() {
                // Stock never comes back, every later arrival would be skipped too
                break;
            }

            let index = policy.choose(&eligible, &mut rng)?;
            views += 1;
            views_per_drop[index] += 1;

            let drop = &mut drops.drops[index];
            let t_remaining = drop.duration_s.saturating_sub(t);
            let p = params.conversion_model.effective_probability(drop.base_p, t_remaining as f64, drop.duration_s as f64);
            let success = rng.gen::<f64>() < p;

            if success {
                drop.record_conversion();
                tokens += 1;
                // Single-step redemption: the token is redeemed right away
                redemptions += 1;
            }
            policy.observe(index, success);

            if trace {
                logln!(logger, LogEvent::Arrival, "t={:>5}s eligible={:?} chose={} p={:.4} converted={} stock_left={}",
                    t, eligible, index, p, success, drops.drops[index].stock);
            }
        }

        let metrics = RunMetrics::from_counts(views, tokens, redemptions, drops.total_sold(), drops.total_initial_stock());

        logln!(logger, LogEvent::Run, "Run policy={} seed={} users={} horizon={}s: {}",
            policy_type, params.seed, params.users, params.horizon_s, metrics.summary_string());

        Ok(Self {
            policy_type,
            params,
            drops,
            views_per_drop,
            metrics,
            policy_state: policy.policy_state_string(),
        })
    }

    /// Output per-drop statistics and the final policy state
    pub fn printout(&self, logger: &mut Logger, event: LogEvent) {
        logln!(logger, event, "\n=== {} (seed {}) ===", self.policy_type, self.params.seed);
        for (index, drop) in self.drops.drops.iter().enumerate() {
            logln!(logger, event, "{} (p={:.2}): shown {} | sold {} / {} | stock left {}",
                drop.name, drop.base_p, self.views_per_drop[index], drop.sold, drop.initial_stock, drop.stock);
        }
        logln!(logger, event, "Policy: {}", self.policy_state);
        logln!(logger, event, "{}", self.metrics.summary_string());
    }
}

/// Run one simulation and return only its metrics
///
/// # Arguments
/// * `drops` - Drops for this run (consumed, build fresh ones per run)
/// * `users` - Number of user arrivals
/// * `horizon_s` - Arrivals are uniform over [0, horizon_s)
/// * `policy_kind` - "random" or "thompson", anything else is `UnsupportedPolicy`
/// * `seed` - Seed of the run-owned random source
pub fn run_single(drops: Drops, users: u64, horizon_s: u64, policy_kind: &str, seed: u64) -> Result<RunMetrics, SimulationError> {
    let policy_type: PolicyType = policy_kind.parse()?;
    let mut logger = Logger::new();
    let run = SimulationRun::new(drops, policy_type, RunParams::new(users, horizon_s, seed), &mut logger)?;
    Ok(run.metrics)
}
