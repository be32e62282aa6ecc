use std::io::{Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use crate::modules::elevator::{MAX_FLOOR, MIN_FLOOR};
use crate::utilities::elevator_status::ElevatorStatus;

const HEADER_LINES: u16 = 4;
const FOOTER_LINES: u16 = 6;

pub struct Debug<W: Write = Stdout> {
    out: W,
    drawn: bool,
}

impl Debug<Stdout> {
    pub fn new() -> Self {
        Debug::with_writer(std::io::stdout())
    }
}

impl Default for Debug<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Debug<W> {
    pub fn with_writer(out: W) -> Self {
        Debug { out, drawn: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_size() -> u16 {
        HEADER_LINES + 2 * (MAX_FLOOR - MIN_FLOOR + 1) as u16 + FOOTER_LINES
    }

    pub fn printstatus(&mut self, status: &ElevatorStatus, pending: usize) -> Result<()> {
        if self.drawn {
            self.out.execute(cursor::MoveUp(Self::status_size()))?;
            self.out.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        self.drawn = true;

        writeln!(self.out, "+--------------------------------------+")?;
        writeln!(self.out, "| CAR                                  |")?;
        writeln!(self.out, "+------------+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} | {2:<10} |", "FLOOR", "CAR", "TARGET")?;
        for floor in (MIN_FLOOR..=MAX_FLOOR).rev() {
            let car = if status.floor == floor { status.state.as_string() } else { String::new() };
            let target = if status.has_target(floor) { "x" } else { "" };
            writeln!(self.out, "+------------+------------+------------+")?;
            writeln!(self.out, "| {0:<10} | {1:<10} | {2:<10} |", floor, car, target)?;
        }
        writeln!(self.out, "+------------+------------+------------+")?;
        writeln!(self.out, "+-------------------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "PENDING", pending)?;
        writeln!(self.out, "+------------+------------+")?;
        writeln!(self.out, "| {0:<10} | {1:<10} |", "STATE", status.state.as_string())?;
        writeln!(self.out, "+------------+------------+")?;

        Ok(())
    }
}
