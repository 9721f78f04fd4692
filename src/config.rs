/// Command line configuration
///
/// Usage:
///     dropsim [compare] [--users N] [--horizon S] [--drops K] [--seeds N] [--csv PATH] [--charts DIR] [--verbose]
///     dropsim list
///     dropsim <scenario>|all [iterations] [start_iteration] [--fastbreak]

use std::path::PathBuf;

use crate::comparison::{ComparisonConfig, Seeds};
use crate::errors::SimulationError;

pub const DEFAULT_USERS: u64 = 1000;
pub const DEFAULT_HORIZON_S: u64 = 900;
pub const DEFAULT_DROPS: usize = 3;
pub const DEFAULT_SEEDS: u64 = 5;
/// Most seeds a registered scenario runs from its base seed
pub const MAX_SCENARIO_SEEDS: u64 = 50;

/// Options of the `compare` command
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub users: u64,
    pub horizon_s: u64,
    pub drops: usize,
    /// Seeds 0..seeds are run
    pub seeds: u64,
    pub csv: Option<PathBuf>,
    pub charts_dir: Option<PathBuf>,
    /// Also print per-run summaries
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS,
            horizon_s: DEFAULT_HORIZON_S,
            drops: DEFAULT_DROPS,
            seeds: DEFAULT_SEEDS,
            csv: None,
            charts_dir: None,
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn comparison_config(&self) -> ComparisonConfig {
        ComparisonConfig::new(self.users, self.horizon_s, self.drops, Seeds::Range(0..self.seeds))
    }
}

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Compare(CliConfig),
    List,
    Scenarios {
        /// Scenario short name or "all"
        name: String,
        iterations: u64,
        start_iteration: u64,
        fastbreak: bool,
    },
}

fn required<'a>(parameter: &str, value: Option<&'a String>) -> Result<&'a str, SimulationError> {
    value.map(String::as_str).ok_or_else(|| SimulationError::invalid(parameter, "missing value"))
}

fn parse_number<T: std::str::FromStr>(parameter: &str, value: &str) -> Result<T, SimulationError> {
    value.parse::<T>()
        .map_err(|_| SimulationError::invalid(parameter, format!("expected a non-negative number, got '{}'", value)))
}

fn parse_compare(args: &[String]) -> Result<CliConfig, SimulationError> {
    let mut config = CliConfig::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--users" => config.users = parse_number("users", required("users", iter.next())?)?,
            "--horizon" => config.horizon_s = parse_number("horizon_s", required("horizon_s", iter.next())?)?,
            "--drops" => config.drops = parse_number("k", required("k", iter.next())?)?,
            "--seeds" => config.seeds = parse_number("seeds", required("seeds", iter.next())?)?,
            "--csv" => config.csv = Some(PathBuf::from(required("csv", iter.next())?)),
            "--charts" => config.charts_dir = Some(PathBuf::from(required("charts", iter.next())?)),
            "--verbose" => config.verbose = true,
            other => return Err(SimulationError::invalid(other, "unknown argument")),
        }
    }
    config.comparison_config().validate()?;
    Ok(config)
}

/// Parse command line arguments (without the program name)
pub fn parse_args(args: &[String]) -> Result<Command, SimulationError> {
    let Some(first) = args.first() else {
        return Ok(Command::Compare(CliConfig::default()));
    };

    if first.starts_with("--") {
        return parse_compare(args).map(Command::Compare);
    }

    match first.as_str() {
        "compare" => parse_compare(&args[1..]).map(Command::Compare),
        "list" => Ok(Command::List),
        name => {
            let mut fastbreak = false;
            let mut positional = Vec::new();
            for arg in &args[1..] {
                if arg == "--fastbreak" {
                    fastbreak = true;
                } else {
                    positional.push(arg.clone());
                }
            }
            if positional.len() > 2 {
                return Err(SimulationError::invalid(&positional[2], "unexpected argument"));
            }
            let iterations: u64 = match positional.first() {
                Some(value) => parse_number("iterations", value)?,
                None => 1,
            };
            if iterations == 0 {
                return Err(SimulationError::invalid("iterations", "must be greater than zero"));
            }
            let start_iteration: u64 = match positional.get(1) {
                Some(value) => parse_number("start_iteration", value)?,
                None => 0,
            };
            // Base seeds run up to start + iterations - 1, each scenario adds its own seed count
            if start_iteration.checked_add(iterations).and_then(|end| end.checked_add(MAX_SCENARIO_SEEDS)).is_none() {
                return Err(SimulationError::invalid("start_iteration",
                    format!("{} plus {} iterations runs past the last seed", start_iteration, iterations)));
            }
            Ok(Command::Scenarios {
                name: name.to_string(),
                iterations,
                start_iteration,
                fastbreak,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_no_arguments_runs_default_comparison() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Compare(CliConfig::default()));
    }

    #[test]
    fn test_compare_flags() {
        let command = parse_args(&args("compare --users 500 --horizon 600 --drops 4 --seeds 50 --csv out/runs.csv --verbose")).unwrap();
        let Command::Compare(config) = command else { panic!("expected compare") };
        assert_eq!(config.users, 500);
        assert_eq!(config.horizon_s, 600);
        assert_eq!(config.drops, 4);
        assert_eq!(config.seeds, 50);
        assert_eq!(config.csv, Some(PathBuf::from("out/runs.csv")));
        assert!(config.verbose);
        assert_eq!(config.comparison_config().seeds, Seeds::Range(0..50));
    }

    #[test]
    fn test_flags_without_subcommand_mean_compare() {
        let command = parse_args(&args("--drops 6")).unwrap();
        assert!(matches!(command, Command::Compare(CliConfig { drops: 6, .. })));
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for bad in ["--users 0", "--horizon 0", "--drops 0", "--seeds 0", "--users -5", "--users lots", "--users", "--bogus 1"] {
            let result = parse_args(&args(bad));
            assert!(matches!(result, Err(SimulationError::InvalidConfiguration { .. })), "{}", bad);
        }
    }

    #[test]
    fn test_scenario_command() {
        let command = parse_args(&args("stock_scarcity 10 5 --fastbreak")).unwrap();
        assert_eq!(command, Command::Scenarios {
            name: "stock_scarcity".to_string(),
            iterations: 10,
            start_iteration: 5,
            fastbreak: true,
        });
        let command = parse_args(&args("all")).unwrap();
        assert_eq!(command, Command::Scenarios {
            name: "all".to_string(),
            iterations: 1,
            start_iteration: 0,
            fastbreak: false,
        });
        assert!(parse_args(&args("all 0")).is_err());
        assert!(parse_args(&args("all x")).is_err());
    }

    #[test]
    fn test_start_iteration_near_seed_limit_is_rejected() {
        for bad in ["stock_scarcity 1 18446744073709551610", "all 2 18446744073709551615", "all 18446744073709551615 1"] {
            let result = parse_args(&args(bad));
            assert!(matches!(result, Err(SimulationError::InvalidConfiguration { ref parameter, .. }) if parameter == "start_iteration"), "{}", bad);
        }
        let last_ok = u64::MAX - MAX_SCENARIO_SEEDS - 1;
        let command = parse_args(&args(&format!("all 1 {}", last_ok))).unwrap();
        assert!(matches!(command, Command::Scenarios { start_iteration, .. } if start_iteration == last_ok));
    }

    #[test]
    fn test_list_command() {
        assert_eq!(parse_args(&args("list")).unwrap(), Command::List);
    }
}
