use std::fmt;
use std::io;

/// Errors surfaced by the simulation engine and its configuration layer
/// Nothing here is transient: every variant is a configuration or usage error
#[derive(Debug)]
pub enum SimulationError {
    /// A configuration value is out of range (zero users, zero horizon, zero drops, ...)
    InvalidConfiguration { parameter: String, reason: String },
    /// Policy identifier other than "random" or "thompson"
    UnsupportedPolicy(String),
    /// A policy was asked to choose from an empty eligible set
    NoEligibleDrops,
    /// Failure while writing exports or log files
    Io(io::Error),
}

impl SimulationError {
    pub fn invalid(parameter: &str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidConfiguration {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidConfiguration { parameter, reason } => {
                write!(f, "Invalid configuration for '{}': {}", parameter, reason)
            }
            SimulationError::UnsupportedPolicy(name) => {
                write!(f, "Unsupported policy '{}' (expected 'random' or 'thompson')", name)
            }
            SimulationError::NoEligibleDrops => write!(f, "No eligible drops to choose from"),
            SimulationError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SimulationError {
    fn from(err: io::Error) -> Self {
        SimulationError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_the_offending_parameter() {
        let err = SimulationError::invalid("users", "must be greater than zero");
        assert_eq!(err.to_string(), "Invalid configuration for 'users': must be greater than zero");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: SimulationError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(err.source().is_some());
        assert!(SimulationError::NoEligibleDrops.source().is_none());
    }
}
