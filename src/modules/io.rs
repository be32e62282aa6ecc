/// ----- I/O MODULE -----
/// Reads trip requests from standard input on its own thread and hands them
/// to the rest of the program over a channel.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Trip { pickup: i32, destination: i32 },
    Target(i32),
    Quit,
}

/// Parses one prompt line: a trip is `<pickup> <destination>`, a single
/// floor adds a target floor. Returns `None` for blank or malformed lines.
pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None
    }
    if matches!(line, "q" | "quit" | "exit") {
        return Some(Input::Quit)
    }
    let floors: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    match floors.as_slice() {
        [floor] => match floor.parse() {
            Ok(floor) => Some(Input::Target(floor)),
            Err(_) => {
                warn!(line, "floor must be a number, skipping");
                None
            }
        },
        [pickup, destination] => match (pickup.parse(), destination.parse()) {
            (Ok(pickup), Ok(destination)) => Some(Input::Trip { pickup, destination }),
            _ => {
                warn!(line, "floors must be numbers, skipping");
                None
            }
        },
        _ => {
            warn!(line, "expected `<pickup> <destination>` or `<floor>`, skipping");
            None
        }
    }
}

pub fn init() -> std::io::Result<Receiver<Input>> {
    let (input_tx, input_rx) = unbounded();
    thread::Builder::new()
        .name("prompt".to_string())
        .spawn(move || read_lines(std::io::stdin().lock(), input_tx))?;
    Ok(input_rx)
}

fn read_lines(reader: impl BufRead, input_tx: Sender<Input>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "could not read from stdin");
                break;
            }
        };
        if let Some(input) = parse_line(&line) {
            let quit = input == Input::Quit;
            if input_tx.send(input).is_err() || quit {
                return
            }
        }
    }
    // end of input
    let _ = input_tx.send(Input::Quit);
}
