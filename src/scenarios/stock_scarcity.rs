/// Scarce stock: 3 drops with only 20 units each for 1000 users.
///
/// Both policies should sell (almost) everything, and once the last unit is gone the
/// remaining users see nothing, so fewer views than users are recorded.
/// Sold units never exceed stock and stock is conserved per drop.

use std::error::Error;

use dropsim::comparison::{compare_with, ComparisonConfig, Seeds};
use dropsim::drops::build_default_drops;
use dropsim::config::MAX_SCENARIO_SEEDS;
use dropsim::logger::{Logger, LogEvent};
use dropsim::logln;
use dropsim::policy::PolicyType;
use dropsim::simulationrun::{RunParams, SimulationRun};

use crate::scenarios::Checks;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "stock_scarcity",
    run,
});

const USERS: u64 = 1000;
const HORIZON_S: u64 = 900;
const NUM_DROPS: usize = 3;
const STOCK: u64 = 20;
const NUM_SEEDS: u64 = 20;
const _: () = assert!(NUM_SEEDS <= MAX_SCENARIO_SEEDS);

pub fn run(scenario_name: &str, base_seed: u64, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let seeds = base_seed..base_seed + NUM_SEEDS;
    let config = ComparisonConfig {
        stock: STOCK,
        ..ComparisonConfig::new(USERS, HORIZON_S, NUM_DROPS, Seeds::Range(seeds.clone()))
    };
    logln!(logger, LogEvent::Scenario, "users={} drops={} stock={} seeds={}..{}",
        USERS, NUM_DROPS, STOCK, seeds.start, seeds.end);

    let comparison = compare_with(&config, logger)?;
    comparison.printout(logger);

    let mut checks = Checks::new();

    for policy_type in PolicyType::ALL {
        let mean = comparison.mean(policy_type);
        checks.check(logger, mean.utilization_stock >= 0.95,
            format!("{} mean stock utilization {:.4} >= 0.95", policy_type, mean.utilization_stock));
        checks.check(logger, mean.views < USERS as f64,
            format!("{} mean views {:.1} < {} users (sold-out drops are not shown)", policy_type, mean.views, USERS));
    }

    // Inspect the final drop state of each run
    let mut violations = 0;
    for seed in seeds {
        for policy_type in PolicyType::ALL {
            let drops = build_default_drops(NUM_DROPS, STOCK, HORIZON_S);
            let run = SimulationRun::new(drops, policy_type, RunParams::new(USERS, HORIZON_S, seed), logger)?;
            run.printout(logger, LogEvent::Scenario);
            for drop in &run.drops.drops {
                if drop.sold > STOCK || drop.sold + drop.stock != drop.initial_stock || drop.redemptions != drop.sold {
                    violations += 1;
                    logln!(logger, LogEvent::Scenario, "{} seed {} {}: sold={} stock={} initial={} redemptions={}",
                        policy_type, seed, drop.name, drop.sold, drop.stock, drop.initial_stock, drop.redemptions);
                }
            }
        }
    }
    checks.check(logger, violations == 0,
        format!("sold <= {} and sold + stock == initial stock for every drop ({} violations)", STOCK, violations));

    checks.finish(scenario_name)
}
