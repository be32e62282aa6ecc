#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

use elevator_dispatch::{
    CancelSignal, ControllerSettings, Elevator, ElevatorAdapter, ElevatorControl, ElevatorError,
    ElevatorSettings, ElevatorState,
};

pub const PATIENCE: Duration = Duration::from_secs(10);

pub fn fast_elevator_settings() -> ElevatorSettings {
    ElevatorSettings {
        travel_delay_ms: 2,
        door_delay_ms: 2,
    }
}

pub fn fast_controller_settings() -> ControllerSettings {
    ControllerSettings {
        operation_timeout_ms: 2000,
        max_retries: 1,
        poll_interval_ms: 20,
    }
}

pub fn adapter() -> Arc<ElevatorAdapter> {
    Arc::new(ElevatorAdapter::new(Arc::new(Elevator::new(&fast_elevator_settings()))))
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

/// Collects every event's level and message.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        LogCapture::default()
    }

    /// A subscriber that records into this capture. Install it on the thread
    /// that should be observed.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry().with(self.clone())
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.level == level && line.message.contains(needle))
            .count()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.lines.lock().push(LogLine {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarOp {
    Move(i32),
    Open(i32),
    Close(i32),
}

/// Forwards to a real adapter and records every operation that succeeded.
pub struct RecordingCar {
    inner: Arc<ElevatorAdapter>,
    ops: Mutex<Vec<CarOp>>,
    recoveries: AtomicUsize,
}

impl RecordingCar {
    pub fn new(inner: Arc<ElevatorAdapter>) -> Self {
        RecordingCar {
            inner,
            ops: Mutex::new(Vec::new()),
            recoveries: AtomicUsize::new(0),
        }
    }

    pub fn ops(&self) -> Vec<CarOp> {
        self.ops.lock().clone()
    }

    pub fn recoveries(&self) -> usize {
        self.recoveries.load(Ordering::SeqCst)
    }

    fn record(&self, result: Result<(), ElevatorError>, op: CarOp) -> Result<(), ElevatorError> {
        if result.is_ok() {
            self.ops.lock().push(op);
        }
        result
    }
}

impl ElevatorControl for RecordingCar {
    fn current_floor(&self) -> i32 {
        self.inner.current_floor()
    }

    fn state(&self) -> ElevatorState {
        self.inner.state()
    }

    fn move_to_floor(&self, floor: i32, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let result = self.inner.move_to_floor(floor, cancel);
        self.record(result, CarOp::Move(floor))
    }

    fn open_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let result = self.inner.open_door(cancel);
        self.record(result, CarOp::Open(self.inner.current_floor()))
    }

    fn close_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        let result = self.inner.close_door(cancel);
        self.record(result, CarOp::Close(self.inner.current_floor()))
    }

    fn force_recovery_to_idle(&self) -> Result<(), ElevatorError> {
        self.recoveries.fetch_add(1, Ordering::SeqCst);
        self.inner.force_recovery_to_idle()
    }
}

/// A car that hangs whenever it is sent to `stuck_floor`. The hung move only
/// returns once its cancel signal fires.
pub struct StallingCar {
    inner: Arc<ElevatorAdapter>,
    stuck_floor: i32,
    stalled_attempts: AtomicUsize,
    recoveries: AtomicUsize,
    recovery_fails: bool,
}

impl StallingCar {
    pub fn new(inner: Arc<ElevatorAdapter>, stuck_floor: i32) -> Self {
        StallingCar {
            inner,
            stuck_floor,
            stalled_attempts: AtomicUsize::new(0),
            recoveries: AtomicUsize::new(0),
            recovery_fails: false,
        }
    }

    /// Every forced recovery is refused and leaves the car as it is.
    pub fn with_failing_recovery(mut self) -> Self {
        self.recovery_fails = true;
        self
    }

    pub fn stalled_attempts(&self) -> usize {
        self.stalled_attempts.load(Ordering::SeqCst)
    }

    pub fn recoveries(&self) -> usize {
        self.recoveries.load(Ordering::SeqCst)
    }
}

impl ElevatorControl for StallingCar {
    fn current_floor(&self) -> i32 {
        self.inner.current_floor()
    }

    fn state(&self) -> ElevatorState {
        self.inner.state()
    }

    fn move_to_floor(&self, floor: i32, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        if floor != self.stuck_floor {
            return self.inner.move_to_floor(floor, cancel)
        }
        self.stalled_attempts.fetch_add(1, Ordering::SeqCst);
        // leave the car wedged in `MovingUp` half way out of its floor
        let wedged = CancelSignal::new();
        wedged.cancel();
        let _ = self.inner.elevator().move_up(&wedged);
        cancel.sleep(Duration::from_secs(60))
    }

    fn open_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        self.inner.open_door(cancel)
    }

    fn close_door(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        self.inner.close_door(cancel)
    }

    fn force_recovery_to_idle(&self) -> Result<(), ElevatorError> {
        self.recoveries.fetch_add(1, Ordering::SeqCst);
        if self.recovery_fails {
            return Err(ElevatorError::InvalidOperation(String::from("car did not respond")))
        }
        self.inner.force_recovery_to_idle()
    }
}
