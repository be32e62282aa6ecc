//! Cancellation that can be waited on with crossbeam selects.
//!
//! A signal owns the sending half of a zero-capacity channel and never sends
//! on it. Cancelling drops that sender, which disconnects the channel and
//! makes every watching receiver ready at once.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Select, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::utilities::error::ElevatorError;

#[derive(Clone, Debug)]
pub struct CancelSignal {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    watched: Vec<Receiver<()>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (trigger_tx, trigger_rx) = bounded(0);
        CancelSignal {
            trigger: Arc::new(Mutex::new(Some(trigger_tx))),
            watched: vec![trigger_rx],
        }
    }

    /// A signal that fires when either this one or the child itself is
    /// cancelled. Cancelling the child leaves the parent untouched.
    pub fn child(&self) -> Self {
        let (trigger_tx, trigger_rx) = bounded(0);
        let mut watched = self.watched.clone();
        watched.push(trigger_rx);
        CancelSignal {
            trigger: Arc::new(Mutex::new(Some(trigger_tx))),
            watched,
        }
    }

    pub fn cancel(&self) {
        self.trigger.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.watched
            .iter()
            .any(|rx| matches!(rx.try_recv(), Err(TryRecvError::Disconnected)))
    }

    pub fn check(&self) -> Result<(), ElevatorError> {
        if self.is_cancelled() {
            return Err(ElevatorError::Cancelled)
        }
        Ok(())
    }

    /// Blocks for `duration` unless the signal fires first.
    ///
    /// `ready_timeout` may wake spuriously, so a wakeup only counts as a
    /// cancellation once `is_cancelled` confirms it.
    pub fn sleep(&self, duration: Duration) -> Result<(), ElevatorError> {
        let deadline = Instant::now() + duration;
        let mut sel = Select::new();
        self.register(&mut sel);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match sel.ready_timeout(remaining) {
                Ok(_) if self.is_cancelled() => return Err(ElevatorError::Cancelled),
                Ok(_) if !remaining.is_zero() => continue,
                _ => return Ok(()),
            }
        }
    }

    /// Adds the watched receivers to `sel`, returning their operation indices.
    pub fn register<'a>(&'a self, sel: &mut Select<'a>) -> Range<usize> {
        let mut indices = 0..0;
        for (i, rx) in self.watched.iter().enumerate() {
            let index = sel.recv(rx);
            if i == 0 {
                indices = index..index;
            }
            indices.end = index + 1;
        }
        indices
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
