/// Drops that end before the arrival horizon does.
///
/// Two variants under the random policy, 1000 users over 900s:
/// - drops lasting the whole 900s horizon
/// - drops lasting only 300s
///
/// A drop stays on offer while it has stock, so users arriving after a short drop's deadline
/// see it at the maximum urgency multiplier. The short variant must therefore convert better.

use std::error::Error;

use dropsim::drops::{build_default_drops, DEFAULT_STOCK};
use dropsim::config::MAX_SCENARIO_SEEDS;
use dropsim::logger::{Logger, LogEvent};
use dropsim::logln;
use dropsim::policy::PolicyType;
use dropsim::simulationrun::{RunMetrics, RunParams, SimulationRun};
use dropsim::comparison::MeanMetrics;

use crate::scenarios::Checks;

// Register this scenario in the catalog
inventory::submit!(crate::scenarios::ScenarioEntry {
    short_name: "late_arrivals",
    run,
});

const USERS: u64 = 1000;
const HORIZON_S: u64 = 900;
const SHORT_DURATION_S: u64 = 300;
const NUM_DROPS: usize = 3;
const NUM_SEEDS: u64 = 30;
const _: () = assert!(NUM_SEEDS <= MAX_SCENARIO_SEEDS);

/// Mean metrics of the random policy for drops lasting `duration_s`
fn run_variant(duration_s: u64, base_seed: u64, logger: &mut Logger) -> Result<MeanMetrics, Box<dyn Error>> {
    let mut runs: Vec<RunMetrics> = Vec::new();
    for seed in base_seed..base_seed + NUM_SEEDS {
        let drops = build_default_drops(NUM_DROPS, DEFAULT_STOCK, duration_s);
        let run = SimulationRun::new(drops, PolicyType::RANDOM, RunParams::new(USERS, HORIZON_S, seed), logger)?;
        runs.push(run.metrics);
    }
    let mean = MeanMetrics::from_runs(&runs);
    logln!(logger, LogEvent::Scenario, "duration={}s: CTR={:.4} tokens={:.1} views={:.1}",
        duration_s, mean.ctr, mean.tokens, mean.views);
    Ok(mean)
}

pub fn run(scenario_name: &str, base_seed: u64, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    let full = run_variant(HORIZON_S, base_seed, logger)?;
    let short = run_variant(SHORT_DURATION_S, base_seed, logger)?;

    let mut checks = Checks::new();
    checks.check(logger, short.ctr > full.ctr,
        format!("{}s drops CTR {:.4} > {}s drops CTR {:.4}", SHORT_DURATION_S, short.ctr, HORIZON_S, full.ctr));
    checks.check(logger, short.runs == full.runs && full.runs == NUM_SEEDS as usize,
        format!("both variants ran {} seeds", NUM_SEEDS));

    checks.finish(scenario_name)
}
