//! Simulation of limited-time, limited-stock offers ("drops") comparing two arm-selection
//! policies: uniform random and Thompson sampling over Beta-Bernoulli arms.
//!
//! Conversion probability rises as a drop approaches its deadline (urgency) and a drop
//! with no stock left is no longer offered (scarcity). Every run is a deterministic,
//! single-threaded pass given its seed.
//!
//! ```
//! use dropsim::{build_default_drops, compare, run_single, PolicyType, Seeds};
//!
//! let metrics = run_single(build_default_drops(3, 120, 900), 500, 900, "random", 42).unwrap();
//! assert!(metrics.tokens <= metrics.views);
//!
//! let comparison = compare(500, 900, 3, Seeds::Range(0..5)).unwrap();
//! let thompson = comparison.mean(PolicyType::THOMPSON);
//! assert_eq!(thompson.runs, 5);
//! ```

pub mod logger;
pub mod errors;
pub mod utils;
pub mod conversion;
pub mod drops;
pub mod policy;
pub mod policies;
pub mod simulationrun;
pub mod comparison;
pub mod config;
pub mod export;
pub mod charts;

pub use comparison::{compare, compare_with, Comparison, ComparisonConfig, MeanMetrics, Seeds};
pub use conversion::ConversionModel;
pub use drops::{build_default_drops, Drop, Drops};
pub use errors::SimulationError;
pub use policy::{PolicyType, SelectionPolicyTrait};
pub use simulationrun::{run_single, RunMetrics, RunParams, SimulationRun};
