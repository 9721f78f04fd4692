mod scenarios;

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use dropsim::charts;
use dropsim::comparison::compare_with;
use dropsim::config::{parse_args, CliConfig, Command};
use dropsim::export::write_csv_file;
use dropsim::logger::{Logger, LogEvent, ConsoleReceiver, FileReceiver, sanitize_filename};
use dropsim::utils::TOTAL_SIMULATION_RUNS;
use dropsim::{log, logln};

use scenarios::get_scenario_catalog;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::Compare(config) => run_compare(&config),
        Command::List => {
            for scenario in get_scenario_catalog() {
                println!("{}", scenario.short_name);
            }
            Ok(())
        }
        Command::Scenarios { name, iterations, start_iteration, fastbreak } => {
            run_scenarios(&name, iterations, start_iteration, fastbreak)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Compare both policies with the command line parameters and print the summary
fn run_compare(config: &CliConfig) -> Result<(), Box<dyn Error>> {
    let mut logger = Logger::new();
    if config.verbose {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Run, LogEvent::Comparison]));
    } else {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Comparison]));
    }

    let comparison_config = config.comparison_config();
    logln!(&mut logger, LogEvent::Comparison, "Params: users={}, horizon={}s, k={}, seeds={}",
        config.users, config.horizon_s, config.drops, config.seeds);
    logln!(&mut logger, LogEvent::Comparison, "{}", "-".repeat(64));

    let comparison = compare_with(&comparison_config, &mut logger)?;
    comparison.printout(&mut logger);

    if let Some(path) = &config.csv {
        write_csv_file(&comparison, path)?;
        logln!(&mut logger, LogEvent::Comparison, "CSV written to {}", path.display());
    }

    if let Some(dir) = &config.charts_dir {
        let bars_path = dir.join("policy_comparison.png");
        let ctr_path = dir.join("ctr_per_seed.png");
        charts::render_policy_comparison(&comparison, &bars_path)?;
        charts::render_ctr_per_seed(&comparison, &ctr_path)?;
        logln!(&mut logger, LogEvent::Comparison, "Charts written to {} and {}", bars_path.display(), ctr_path.display());
    }

    logger.flush()?;
    Ok(())
}

/// Run one scenario (or "all") for several iterations, the iteration index is the base seed
fn run_scenarios(scenario_arg: &str, iterations: u64, start_iteration: u64, fastbreak: bool) -> Result<(), Box<dyn Error>> {
    let all_scenarios = get_scenario_catalog();

    let scenarios: Vec<_> = if scenario_arg == "all" {
        all_scenarios.clone()
    } else {
        match all_scenarios.iter().find(|s| s.short_name == scenario_arg) {
            Some(scenario) => vec![scenario.clone()],
            None => {
                let names: Vec<&str> = all_scenarios.iter().map(|s| s.short_name).collect();
                return Err(format!("Scenario '{}' not found. Available scenarios: {}", scenario_arg, names.join(", ")).into());
            }
        }
    };

    // Scenario checks are shown on the console only for a single scenario run once
    let mut logger = Logger::new();
    if scenario_arg != "all" && iterations == 1 {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation, LogEvent::Scenario]));
    } else {
        logger.add_receiver(ConsoleReceiver::new(vec![LogEvent::Validation]));
    }
    let summary_receiver_id = logger.add_receiver(FileReceiver::new(&PathBuf::from("log/summary.log"), vec![LogEvent::Validation])?);

    TOTAL_SIMULATION_RUNS.store(0, Ordering::Relaxed);

    if scenario_arg == "all" {
        logln!(&mut logger, LogEvent::Validation, "Running all scenarios {} time(s)...\n", iterations);
    } else {
        logln!(&mut logger, LogEvent::Validation, "Running scenario '{}' {} time(s)...\n", scenario_arg, iterations);
    }

    let mut failures = 0u64;
    'scenarios: for scenario in &scenarios {
        log!(&mut logger, LogEvent::Validation, "{}: ", scenario.short_name);

        let scenario_log = PathBuf::from(format!("log/{}/scenario.log", sanitize_filename(scenario.short_name)));
        let scenario_receiver_id = logger.add_receiver(FileReceiver::new(&scenario_log, vec![LogEvent::Comparison, LogEvent::Scenario])?);

        for i in start_iteration..(start_iteration + iterations) {
            if iterations > 1 {
                log!(&mut logger, LogEvent::Validation, "[{}/{}] ", i - start_iteration + 1, iterations);
            }

            match (scenario.run)(scenario.short_name, i, &mut logger) {
                Ok(()) => {
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✓");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✓ PASSED");
                    }
                }
                Err(e) => {
                    failures += 1;
                    if iterations > 1 {
                        logln!(&mut logger, LogEvent::Validation, "✗");
                    } else {
                        logln!(&mut logger, LogEvent::Validation, "✗ FAILED: {}", e);
                    }

                    if fastbreak {
                        logger.remove_receiver(scenario_receiver_id);
                        logln!(&mut logger, LogEvent::Validation, "\nStopping scenario execution due to failure (--fastbreak enabled)");
                        logln!(&mut logger, LogEvent::Validation, "Error at iteration {}/{} (seed {}): {}",
                            i - start_iteration + 1, iterations, i, e);
                        break 'scenarios;
                    }
                }
            }

            logger.flush()?;
        }

        logger.remove_receiver(scenario_receiver_id);
    }

    logln!(&mut logger, LogEvent::Validation, "\nTotal simulation runs completed: {}",
        TOTAL_SIMULATION_RUNS.load(Ordering::Relaxed));
    logger.flush()?;
    logger.remove_receiver(summary_receiver_id);

    if failures > 0 {
        return Err(format!("{} scenario run(s) failed", failures).into());
    }
    Ok(())
}
