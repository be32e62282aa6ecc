/// ----- ELEVATOR MODULE -----
/// The state machine of the car. It owns the current floor and state,
/// validates every state change against the transition table and simulates
/// travel and door time with delays taken outside of its lock.

use std::collections::BTreeSet;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::utilities::cancel::CancelSignal;
use crate::utilities::config::ElevatorSettings;
use crate::utilities::direction::Direction;
use crate::utilities::elevator_status::{ElevatorState, ElevatorStatus};
use crate::utilities::error::ElevatorError;

pub const MIN_FLOOR: i32 = 1;
pub const MAX_FLOOR: i32 = 10;

pub fn floor_in_range(floor: i32) -> bool {
    (MIN_FLOOR..=MAX_FLOOR).contains(&floor)
}

#[derive(Debug)]
struct Car {
    floor: i32,
    state: ElevatorState,
    target_floors: BTreeSet<i32>,
}

impl Car {
    fn transition_to(&mut self, target: ElevatorState) -> Result<(), ElevatorError> {
        if !self.state.can_transition_to(target) {
            return Err(ElevatorError::InvalidStateTransition {
                from: self.state,
                to: target,
            })
        }
        self.state = target;
        Ok(())
    }
}

#[derive(Debug)]
pub struct Elevator {
    car: Mutex<Car>,
    travel_delay: Duration,
    door_delay: Duration,
}

impl Elevator {
    pub fn new(settings: &ElevatorSettings) -> Self {
        Elevator {
            car: Mutex::new(Car {
                floor: MIN_FLOOR,
                state: ElevatorState::Idle,
                target_floors: BTreeSet::new(),
            }),
            travel_delay: settings.travel_delay(),
            door_delay: settings.door_delay(),
        }
    }

    pub fn current_floor(&self) -> i32 {
        self.car.lock().floor
    }

    pub fn state(&self) -> ElevatorState {
        self.car.lock().state
    }

    pub fn target_floors(&self) -> Vec<i32> {
        self.car.lock().target_floors.iter().copied().collect()
    }

    pub fn status(&self) -> ElevatorStatus {
        let car = self.car.lock();
        ElevatorStatus {
            floor: car.floor,
            state: car.state,
            target_floors: car.target_floors.iter().copied().collect(),
        }
    }

    pub fn move_up(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        self.step(Direction::Up, cancel)
    }

    pub fn move_down(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        self.step(Direction::Down, cancel)
    }

    /// Moves one floor. The floor changes as soon as the car starts moving, so
    /// a cancelled travel delay leaves the new floor in place and the state in
    /// `MovingUp`/`MovingDown` until something recovers it.
    fn step(&self, direction: Direction, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let (moving, limit, delta) = match direction {
            Direction::Up => (ElevatorState::MovingUp, MAX_FLOOR, 1),
            Direction::Down => (ElevatorState::MovingDown, MIN_FLOOR, -1),
        };
        {
            let mut car = self.car.lock();
            if car.floor == limit {
                return Err(ElevatorError::InvalidOperation(format!(
                    "cannot move {} from floor {}",
                    direction.as_string(),
                    car.floor
                )))
            }
            car.transition_to(moving)?;
            car.floor += delta;
            debug!(floor = car.floor, direction = %direction.as_string(), "car moving");
        }

        cancel.sleep(self.travel_delay)?;

        self.car.lock().transition_to(ElevatorState::Idle)
    }

    pub fn open_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        {
            let mut car = self.car.lock();
            if car.state != ElevatorState::Idle {
                return Err(ElevatorError::InvalidStateTransition {
                    from: car.state,
                    to: ElevatorState::DoorOpen,
                })
            }
            car.transition_to(ElevatorState::DoorOpen)?;
            debug!(floor = car.floor, "door opening");
        }
        cancel.sleep(self.door_delay)
    }

    pub fn close_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        {
            let car = self.car.lock();
            if car.state != ElevatorState::DoorOpen {
                return Err(ElevatorError::InvalidStateTransition {
                    from: car.state,
                    to: ElevatorState::Idle,
                })
            }
        }
        cancel.sleep(self.door_delay)?;

        let mut car = self.car.lock();
        car.transition_to(ElevatorState::Idle)?;
        debug!(floor = car.floor, "door closed");
        Ok(())
    }

    pub fn add_request(&self, floor: i32) -> Result<(), ElevatorError> {
        if !floor_in_range(floor) {
            return Err(ElevatorError::InvalidFloor(floor))
        }
        self.car.lock().target_floors.insert(floor);
        Ok(())
    }

    /// Puts the car back in `Idle` without consulting the transition table.
    /// Only meant for getting out of a state left behind by a timed out
    /// operation.
    pub fn force_recovery_to_idle(&self) {
        let mut car = self.car.lock();
        if car.state != ElevatorState::Idle {
            warn!(floor = car.floor, from = %car.state, "forcing car back to idle");
        }
        car.state = ElevatorState::Idle;
    }
}
