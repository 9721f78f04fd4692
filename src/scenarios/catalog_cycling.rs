/// More drops than the base probability catalog has entries: 8 drops over a 6 entry catalog.
///
/// Drops 7 and 8 reuse the first catalog entries. With 8 arms to explore and 2000 users
/// Thompson sampling still has to end up ahead of uniform random.

use std::error::Error;

use dropsim::comparison::{compare_with, ComparisonConfig, Seeds};
use dropsim::drops::{build_default_drops, BASE_P_CATALOG, DEFAULT_STOCK};
use dropsim::config::MAX_SCENARIO_SEEDS;
use dropsim::logger::{Logger, LogEvent};
use dropsim::logln;
use dropsim::policy::PolicyType;

use crate::scenarios::Checks;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "catalog_cycling",
    run,
});

const USERS: u64 = 2000;
const HORIZON_S: u64 = 900;
const NUM_DROPS: usize = 8;
const NUM_SEEDS: u64 = 30;
const _: () = assert!(NUM_SEEDS <= MAX_SCENARIO_SEEDS);

pub fn run(scenario_name: &str, base_seed: u64, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let mut checks = Checks::new();

    let drops = build_default_drops(NUM_DROPS, DEFAULT_STOCK, HORIZON_S);
    let wrapped = drops.drops
        .iter()
        .enumerate()
        .all(|(i, drop)| drop.base_p == BASE_P_CATALOG[i % BASE_P_CATALOG.len()]);
    let base_ps: Vec<String> = drops.drops.iter().map(|drop| format!("{:.2}", drop.base_p)).collect();
    checks.check(logger, wrapped,
        format!("base probabilities cycle through the catalog: [{}]", base_ps.join(", ")));

    let config = ComparisonConfig::new(USERS, HORIZON_S, NUM_DROPS, Seeds::Range(base_seed..base_seed + NUM_SEEDS));
    logln!(logger, LogEvent::Scenario, "users={} drops={} seeds={}..{}",
        USERS, NUM_DROPS, base_seed, base_seed + NUM_SEEDS);

    let comparison = compare_with(&config, logger)?;
    comparison.printout(logger);

    let random = comparison.mean(PolicyType::RANDOM);
    let thompson = comparison.mean(PolicyType::THOMPSON);
    checks.check(logger, thompson.ctr >= random.ctr,
        format!("Thompson mean CTR {:.4} >= Random mean CTR {:.4}", thompson.ctr, random.ctr));

    checks.finish(scenario_name)
}
