use std::fmt;

use crate::utilities::direction::Direction;
use crate::utilities::error::ElevatorError;

/// One passenger trip. The direction is derived from the two floors and never
/// stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElevatorRequest {
    pickup_floor: i32,
    destination_floor: i32,
}

impl ElevatorRequest {
    pub fn new(pickup_floor: i32, destination_floor: i32) -> Result<Self, ElevatorError> {
        if pickup_floor == destination_floor {
            return Err(ElevatorError::InvalidPickupAndDestination(pickup_floor))
        }
        Ok(ElevatorRequest {
            pickup_floor,
            destination_floor,
        })
    }

    pub fn pickup_floor(&self) -> i32 {
        self.pickup_floor
    }

    pub fn destination_floor(&self) -> i32 {
        self.destination_floor
    }

    pub fn direction(&self) -> Direction {
        if self.destination_floor > self.pickup_floor {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for ElevatorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.pickup_floor,
            self.destination_floor,
            self.direction().as_string()
        )
    }
}
