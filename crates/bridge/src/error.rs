//! Service error types

use contracts::ContractError;
use thiserror::Error;

use crate::state::ServiceState;

/// Service lifecycle errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Operation not allowed in the current state
    #[error("cannot {operation} a service that is {state}")]
    InvalidState {
        operation: &'static str,
        state: ServiceState,
    },

    /// Start aborted; the service stays `Created`
    #[error("startup failed during {stage}: {source}")]
    Startup {
        stage: &'static str,
        #[source]
        source: ContractError,
    },

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ContractError),
}

impl ServiceError {
    pub(crate) fn invalid_state(operation: &'static str, state: ServiceState) -> Self {
        Self::InvalidState { operation, state }
    }

    pub(crate) fn startup(stage: &'static str, source: impl Into<ContractError>) -> Self {
        Self::Startup {
            stage,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ServiceError::invalid_state("stop", ServiceState::Created);
        assert_eq!(err.to_string(), "cannot stop a service that is created");

        let err = ServiceError::startup("bind", std::io::Error::other("address in use"));
        assert!(err.to_string().starts_with("startup failed during bind"));
    }
}
