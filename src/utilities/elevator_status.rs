use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ElevatorState {
    Idle,
    MovingUp,
    MovingDown,
    DoorOpen,
}

impl ElevatorState {
    pub fn as_string(&self) -> String {
        match self {
            ElevatorState::Idle => String::from("idle"),
            ElevatorState::MovingUp => String::from("movingUp"),
            ElevatorState::MovingDown => String::from("movingDown"),
            ElevatorState::DoorOpen => String::from("doorOpen"),
        }
    }

    /// Transition table of the car. Staying in the same state is always
    /// allowed; every other move goes through `Idle`.
    pub fn can_transition_to(self, target: ElevatorState) -> bool {
        if self == target {
            return true
        }
        matches!(
            (self, target),
            (ElevatorState::Idle, ElevatorState::MovingUp)
                | (ElevatorState::Idle, ElevatorState::MovingDown)
                | (ElevatorState::Idle, ElevatorState::DoorOpen)
                | (ElevatorState::MovingUp, ElevatorState::Idle)
                | (ElevatorState::MovingDown, ElevatorState::Idle)
                | (ElevatorState::DoorOpen, ElevatorState::Idle)
        )
    }

    pub fn iter() -> impl Iterator<Item = ElevatorState> {
        [
            ElevatorState::Idle,
            ElevatorState::MovingUp,
            ElevatorState::MovingDown,
            ElevatorState::DoorOpen,
        ]
        .iter()
        .copied()
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Point-in-time copy of the car, taken under the elevator's lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub floor: i32,
    pub state: ElevatorState,
    pub target_floors: Vec<i32>,
}

impl ElevatorStatus {
    pub fn has_target(&self, floor: i32) -> bool {
        self.target_floors.contains(&floor)
    }
}
