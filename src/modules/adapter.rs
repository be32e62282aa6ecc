/// ----- ADAPTER MODULE -----
/// Wraps the elevator with floor validation and a step-until-arrival
/// movement routine. This is the surface the controller drives.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::modules::elevator::{floor_in_range, Elevator};
use crate::utilities::cancel::CancelSignal;
use crate::utilities::direction::Direction;
use crate::utilities::elevator_status::{ElevatorState, ElevatorStatus};
use crate::utilities::error::ElevatorError;

/// Operations the controller needs from a car.
pub trait ElevatorControl: Send + Sync {
    fn current_floor(&self) -> i32;

    fn state(&self) -> ElevatorState;

    fn move_to_floor(&self, floor: i32, cancel: &CancelSignal) -> Result<(), ElevatorError>;

    fn open_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError>;

    fn close_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError>;

    fn force_recovery_to_idle(&self) -> Result<(), ElevatorError>;

    fn validate_floor(&self, floor: i32) -> Result<(), ElevatorError> {
        if !floor_in_range(floor) {
            return Err(ElevatorError::InvalidFloor(floor))
        }
        Ok(())
    }
}

pub struct ElevatorAdapter {
    elevator: Arc<Elevator>,
    // held for a whole logical movement; the elevator's own lock is never
    // held across a delay, so readers are not blocked by this
    movement: Mutex<()>,
}

impl ElevatorAdapter {
    pub fn new(elevator: Arc<Elevator>) -> Self {
        ElevatorAdapter {
            elevator,
            movement: Mutex::new(()),
        }
    }

    pub fn elevator(&self) -> &Arc<Elevator> {
        &self.elevator
    }

    pub fn status(&self) -> ElevatorStatus {
        self.elevator.status()
    }

    pub fn add_request(&self, floor: i32) -> Result<(), ElevatorError> {
        self.validate_floor(floor)?;
        self.elevator.add_request(floor)
    }
}

impl ElevatorControl for ElevatorAdapter {
    fn current_floor(&self) -> i32 {
        self.elevator.current_floor()
    }

    fn state(&self) -> ElevatorState {
        self.elevator.state()
    }

    fn move_to_floor(&self, floor: i32, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        self.validate_floor(floor)?;
        let _movement = self.movement.lock();

        if self.elevator.current_floor() == floor {
            return Ok(())
        }
        if self.elevator.state() == ElevatorState::DoorOpen {
            self.elevator.close_door(cancel)?;
        }

        loop {
            cancel.check()?;
            match Direction::between(self.elevator.current_floor(), floor) {
                Some(Direction::Up) => self.elevator.move_up(cancel)?,
                Some(Direction::Down) => self.elevator.move_down(cancel)?,
                None => break,
            }
        }
        debug!(floor, "arrived");

        self.elevator.open_door(cancel)?;
        self.elevator.close_door(cancel)
    }

    fn open_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let _movement = self.movement.lock();
        self.elevator.open_door(cancel)
    }

    fn close_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let _movement = self.movement.lock();
        self.elevator.close_door(cancel)
    }

    fn force_recovery_to_idle(&self) -> Result<(), ElevatorError> {
        self.elevator.force_recovery_to_idle();
        Ok(())
    }
}
