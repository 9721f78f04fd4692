/// Baseline comparison of the two selection policies on the default catalog:
///
/// - 3 drops with 120 units each, alive for the whole 900s horizon
/// - 500 users per run, 50 seeds starting at the base seed
///
/// Thompson sampling should learn which drop converts best and beat uniform random on CTR.
/// Every run must also keep its accounting straight and a rerun must be bit-identical.

use std::error::Error;

use dropsim::comparison::{compare_with, ComparisonConfig, Seeds};
use dropsim::config::MAX_SCENARIO_SEEDS;
use dropsim::logger::{Logger, LogEvent};
use dropsim::logln;
use dropsim::policy::PolicyType;

use crate::scenarios::Checks;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "baseline_comparison",
    run,
});

const USERS: u64 = 500;
const HORIZON_S: u64 = 900;
const NUM_DROPS: usize = 3;
const NUM_SEEDS: u64 = 50;
const _: () = assert!(NUM_SEEDS <= MAX_SCENARIO_SEEDS);

pub fn run(scenario_name: &str, base_seed: u64, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let config = ComparisonConfig::new(USERS, HORIZON_S, NUM_DROPS, Seeds::Range(base_seed..base_seed + NUM_SEEDS));
    logln!(logger, LogEvent::Scenario, "users={} horizon={}s drops={} seeds={}..{}",
        USERS, HORIZON_S, NUM_DROPS, base_seed, base_seed + NUM_SEEDS);

    let comparison = compare_with(&config, logger)?;
    comparison.printout(logger);

    let mut checks = Checks::new();

    let random = comparison.mean(PolicyType::RANDOM);
    let thompson = comparison.mean(PolicyType::THOMPSON);
    checks.check(logger, thompson.ctr >= random.ctr,
        format!("Thompson mean CTR {:.4} >= Random mean CTR {:.4}", thompson.ctr, random.ctr));

    let rows = comparison.rows();
    let bad_accounting = rows
        .iter()
        .filter(|row| row.metrics.tokens > row.metrics.views || row.metrics.redemptions != row.metrics.tokens)
        .count();
    checks.check(logger, bad_accounting == 0,
        format!("tokens <= views and redemptions == tokens in all {} runs ({} violations)", rows.len(), bad_accounting));

    let mut quiet = Logger::new();
    let rerun = compare_with(&config, &mut quiet)?;
    checks.check(logger, rerun == comparison,
        "rerunning the same seeds reproduces every run exactly".to_string());

    checks.finish(scenario_name)
}
