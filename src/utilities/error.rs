use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::modules::elevator::{MAX_FLOOR, MIN_FLOOR};
use crate::utilities::elevator_status::ElevatorState;

/// Failures raised by the elevator, the adapter and the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElevatorError {
    #[error("floor {0} is outside {min}..={max}", min = MIN_FLOOR, max = MAX_FLOOR)]
    InvalidFloor(i32),

    #[error("pickup and destination are both floor {0}")]
    InvalidPickupAndDestination(i32),

    #[error("cannot go from {from} to {to}")]
    InvalidStateTransition {
        from: ElevatorState,
        to: ElevatorState,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation did not finish within {0:?}")]
    Timeout(Duration),

    #[error("worker for {0} exited without reporting a result")]
    WorkerLost(String),

    #[error("could not spawn worker: {0}")]
    Spawn(String),
}

impl ElevatorError {
    /// Errors produced by the state machine's own rules. The processing loop
    /// logs these as warnings; everything else is logged as an error.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ElevatorError::InvalidFloor(_)
                | ElevatorError::InvalidPickupAndDestination(_)
                | ElevatorError::InvalidStateTransition { .. }
                | ElevatorError::InvalidOperation(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
