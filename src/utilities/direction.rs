use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    /// Direction of travel from `from` to `to`, `None` when they are the same floor.
    pub fn between(from: i32, to: i32) -> Option<Self> {
        match to.cmp(&from) {
            Ordering::Greater => Some(Direction::Up),
            Ordering::Less => Some(Direction::Down),
            Ordering::Equal => None,
        }
    }

    pub fn as_string(self) -> String {
        match self {
            Direction::Down => String::from("down"),
            Direction::Up => String::from("up"),
        }
    }
}
