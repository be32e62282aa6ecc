/// ----- CONTROLLER MODULE -----
/// Accepts trip requests from any thread and runs the single processing
/// loop that drives the car through pickup and drop-off. Every movement and
/// door step runs on a worker thread with a timeout, forced recovery and a
/// bounded number of retries.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Select, Sender, TryRecvError};
use tracing::{error, info, warn};

use crate::modules::adapter::ElevatorControl;
use crate::modules::scheduler::Scheduler;
use crate::utilities::cancel::CancelSignal;
use crate::utilities::config::ControllerSettings;
use crate::utilities::elevator_status::ElevatorState;
use crate::utilities::error::ElevatorError;
use crate::utilities::request::ElevatorRequest;

/// One retried unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    MoveTo(i32),
    OpenDoor,
    CloseDoor,
}

impl Step {
    fn execute(
        self,
        car: &dyn ElevatorControl,
        cancel: &CancelSignal,
    ) -> Result<(), ElevatorError> {
        match self {
            Step::MoveTo(floor) => car.move_to_floor(floor, cancel),
            Step::OpenDoor => car.open_door(cancel),
            Step::CloseDoor => car.close_door(cancel),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::MoveTo(floor) => write!(f, "move to floor {floor}"),
            Step::OpenDoor => f.write_str("open door"),
            Step::CloseDoor => f.write_str("close door"),
        }
    }
}

/// How a retried step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// The car was not in a state the step could start from.
    Skipped,
    /// Every attempt timed out. The step is dropped and processing goes on.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryPhase {
    Attempting,
    TimedOut,
    Recovering,
    Retrying,
    Exhausted,
}

pub struct ElevatorController {
    car: Arc<dyn ElevatorControl>,
    scheduler: Arc<dyn Scheduler>,
    settings: ControllerSettings,
    processing: AtomicBool,
    wakeup_tx: Sender<()>,
    wakeup_rx: Receiver<()>,
}

// clears the single-consumer flag however the loop exits
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ElevatorController {
    pub fn new(
        car: Arc<dyn ElevatorControl>,
        scheduler: Arc<dyn Scheduler>,
        settings: ControllerSettings,
    ) -> Self {
        let (wakeup_tx, wakeup_rx) = bounded(1);
        ElevatorController {
            car,
            scheduler,
            settings,
            processing: AtomicBool::new(false),
            wakeup_tx,
            wakeup_rx,
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Validates and queues a trip. Invalid trips are logged and dropped;
    /// nothing is reported back to the caller.
    pub fn request_elevator(&self, pickup: i32, destination: i32) {
        let request = match self.validate_request(pickup, destination) {
            Ok(request) => request,
            Err(e) => {
                warn!(pickup, destination, error = %e, "rejected elevator request");
                return
            }
        };
        self.scheduler.enqueue(request);
        info!(
            pickup,
            destination,
            direction = %request.direction().as_string(),
            "request accepted"
        );
        // a full channel already holds a pending wakeup
        let _ = self.wakeup_tx.try_send(());
    }

    fn validate_request(
        &self,
        pickup: i32,
        destination: i32,
    ) -> Result<ElevatorRequest, ElevatorError> {
        if pickup == destination {
            return Err(ElevatorError::InvalidPickupAndDestination(pickup))
        }
        self.car.validate_floor(pickup)?;
        self.car.validate_floor(destination)?;
        ElevatorRequest::new(pickup, destination)
    }

    /// Runs until `cancel` fires. Only one caller may be inside at a time.
    pub fn process_requests(&self, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ElevatorError::InvalidOperation(String::from(
                "request processing is already running",
            )))
        }
        let _guard = ProcessingGuard(&self.processing);
        info!("request processing started");

        while !cancel.is_cancelled() {
            let request = match self.scheduler.get_next() {
                Some(request) => request,
                None => {
                    self.wait_for_work(cancel);
                    continue;
                }
            };
            let next = self.scheduler.peek_next();

            match self.serve(&request, next, cancel) {
                Ok(()) => info!(%request, "request served"),
                Err(ElevatorError::Cancelled) => {
                    info!(%request, "request interrupted by shutdown");
                }
                Err(e) if e.is_domain() => warn!(%request, error = %e, "request failed"),
                Err(e) => error!(%request, error = %e, "unexpected failure while serving request"),
            }
        }

        info!("request processing stopped");
        Ok(())
    }

    fn wait_for_work(&self, cancel: &CancelSignal) {
        let mut sel = Select::new();
        let work = sel.recv(&self.wakeup_rx);
        cancel.register(&mut sel);
        if let Ok(index) = sel.ready_timeout(self.settings.poll_interval()) {
            if index == work {
                let _ = self.wakeup_rx.try_recv();
            }
        }
    }

    fn serve(
        &self,
        request: &ElevatorRequest,
        next: Option<ElevatorRequest>,
        cancel: &CancelSignal,
    ) -> Result<(), ElevatorError> {
        info!(%request, "serving request");
        let destination = request.destination_floor();

        self.run_step(Step::MoveTo(request.pickup_floor()), cancel)?;
        self.open_door(cancel)?;
        self.close_door(cancel)?;

        self.run_step(Step::MoveTo(destination), cancel)?;
        self.open_door(cancel)?;

        match next {
            Some(next) if next.pickup_floor() == destination => {
                info!(floor = destination, next = %next, "keeping door open for next pickup");
            }
            _ => {
                self.close_door(cancel)?;
            }
        }
        Ok(())
    }

    fn open_door(&self, cancel: &CancelSignal) -> Result<StepOutcome, ElevatorError> {
        if self.car.state() == ElevatorState::DoorOpen {
            return Ok(StepOutcome::Skipped)
        }
        self.run_step(Step::OpenDoor, cancel)
    }

    fn close_door(&self, cancel: &CancelSignal) -> Result<StepOutcome, ElevatorError> {
        if self.car.state() == ElevatorState::Idle {
            return Ok(StepOutcome::Skipped)
        }
        self.run_step(Step::CloseDoor, cancel)
    }

    /// Runs `step` with the operation timeout, recovering the car and retrying
    /// after each timeout until the retries run out.
    pub fn run_step(
        &self,
        step: Step,
        cancel: &CancelSignal,
    ) -> Result<StepOutcome, ElevatorError> {
        let mut retries = 0;
        let mut phase = RetryPhase::Attempting;
        loop {
            phase = match phase {
                RetryPhase::Attempting => match self.attempt(step, cancel) {
                    Ok(()) => return Ok(StepOutcome::Completed),
                    Err(ElevatorError::Timeout(_)) => RetryPhase::TimedOut,
                    Err(e @ ElevatorError::InvalidStateTransition { .. }) => {
                        warn!(%step, error = %e, "skipping step");
                        return Ok(StepOutcome::Skipped)
                    }
                    Err(e) => return Err(e),
                },
                RetryPhase::TimedOut => {
                    warn!(
                        %step,
                        timeout_ms = self.settings.operation_timeout_ms,
                        "step timed out"
                    );
                    RetryPhase::Recovering
                }
                RetryPhase::Recovering => {
                    match self.car.force_recovery_to_idle() {
                        Ok(()) => {
                            info!(floor = self.car.current_floor(), "recovered car to idle")
                        }
                        Err(e) => error!(error = %e, "recovery to idle failed"),
                    }
                    if retries < self.settings.max_retries {
                        RetryPhase::Retrying
                    } else {
                        RetryPhase::Exhausted
                    }
                }
                RetryPhase::Retrying => {
                    retries += 1;
                    info!(%step, attempt = retries + 1, "retrying step");
                    RetryPhase::Attempting
                }
                RetryPhase::Exhausted => {
                    error!(%step, attempts = retries + 1, "giving up on step");
                    return Ok(StepOutcome::Abandoned)
                }
            };
        }
    }

    /// One attempt on a worker thread. The attempt gets its own child signal,
    /// fired once the wait is over so a timed out worker stops on its own.
    fn attempt(&self, step: Step, cancel: &CancelSignal) -> Result<(), ElevatorError> {
        cancel.check()?;
        let attempt = cancel.child();
        let (result_tx, result_rx) = bounded(1);
        {
            let car = Arc::clone(&self.car);
            let attempt = attempt.clone();
            thread::Builder::new()
                .name(String::from("elevator_step"))
                .spawn(move || {
                    let _ = result_tx.send(step.execute(car.as_ref(), &attempt));
                })
                .map_err(|e| ElevatorError::Spawn(e.to_string()))?;
        }

        let result = self.await_result(step, &result_rx, cancel);
        attempt.cancel();
        result
    }

    /// Waits for the worker until the operation timeout. Select wakeups are
    /// only hints, so each one is confirmed before it ends the wait.
    fn await_result(
        &self,
        step: Step,
        result_rx: &Receiver<Result<(), ElevatorError>>,
        cancel: &CancelSignal,
    ) -> Result<(), ElevatorError> {
        let timeout = self.settings.operation_timeout();
        let deadline = Instant::now() + timeout;
        let mut sel = Select::new();
        let done = sel.recv(result_rx);
        cancel.register(&mut sel);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ElevatorError::Timeout(timeout))
            }
            match sel.ready_timeout(remaining) {
                Ok(index) if index == done => match result_rx.try_recv() {
                    Ok(result) => return result,
                    Err(TryRecvError::Empty) => continue,
                    Err(TryRecvError::Disconnected) => {
                        return Err(ElevatorError::WorkerLost(step.to_string()))
                    }
                },
                Ok(_) if cancel.is_cancelled() => return Err(ElevatorError::Cancelled),
                Ok(_) => continue,
                Err(_) => return Err(ElevatorError::Timeout(timeout)),
            }
        }
    }
}
