//! Dispatch and control of a single elevator car serving floors 1 to 10.
//!
//! Requests are queued first in, first out and served by one processing loop
//! that moves the car, operates the door, and recovers the car when an
//! operation times out.

pub mod modules;
pub mod utilities;

pub use modules::adapter::{ElevatorAdapter, ElevatorControl};
pub use modules::controller::{ElevatorController, Step, StepOutcome};
pub use modules::elevator::{Elevator, MAX_FLOOR, MIN_FLOOR};
pub use modules::scheduler::{FifoScheduler, Scheduler};
pub use utilities::cancel::CancelSignal;
pub use utilities::config::{Config, ControllerSettings, ElevatorSettings};
pub use utilities::direction::Direction;
pub use utilities::elevator_status::{ElevatorState, ElevatorStatus};
pub use utilities::error::{ConfigError, ElevatorError};
pub use utilities::request::ElevatorRequest;
