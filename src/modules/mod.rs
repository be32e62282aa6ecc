use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, tick};
use tracing::{error, info, warn};

use crate::utilities::cancel::CancelSignal;
use crate::utilities::config::Config;
use crate::utilities::debug::Debug;

pub mod adapter;
pub mod controller;
pub mod elevator;
pub mod io;
pub mod scheduler;

use adapter::ElevatorAdapter;
use controller::ElevatorController;
use elevator::{Elevator, MAX_FLOOR, MIN_FLOOR};
use io::Input;
use scheduler::FifoScheduler;

pub fn run(config: Config, status_view: bool) -> std::io::Result<()> {
    // BUILD THE CAR AND ITS CONTROLLER
    let elevator = Arc::new(Elevator::new(&config.elevator));
    let adapter = Arc::new(ElevatorAdapter::new(elevator));
    let scheduler = Arc::new(FifoScheduler::new());
    let controller = Arc::new(ElevatorController::new(
        adapter.clone(),
        scheduler,
        config.controller.clone(),
    ));
    let cancel = CancelSignal::new();

    // INITIALIZE THREAD FOR REQUEST PROCESSING
    let processing = {
        let controller = Arc::clone(&controller);
        let cancel = cancel.clone();
        thread::Builder::new().name("processing".to_string()).spawn(move || {
            if let Err(e) = controller.process_requests(&cancel) {
                error!(error = %e, "request processing could not start");
            }
        })?
    };

    // INITIALIZE INPUT MODULE
    let input_rx = io::init()?;
    info!(
        min_floor = MIN_FLOOR,
        max_floor = MAX_FLOOR,
        "enter `<pickup> <destination>` to call the elevator, \
         `<floor>` to mark a target, `q` to quit"
    );

    let mut debug = Debug::new();
    let redraw = tick(Duration::from_millis(250));

    loop {
        select! {
            recv(input_rx) -> msg => match msg {
                Ok(Input::Trip { pickup, destination }) => {
                    controller.request_elevator(pickup, destination)
                },
                Ok(Input::Target(floor)) => {
                    if let Err(e) = adapter.add_request(floor) {
                        warn!(floor, error = %e, "rejected target floor");
                    }
                },
                Ok(Input::Quit) | Err(_) => break,
            },
            recv(redraw) -> _ => {
                if status_view {
                    let pending = controller.pending_requests();
                    if let Err(e) = debug.printstatus(&adapter.status(), pending) {
                        warn!(error = %e, "could not draw status");
                    }
                }
            },
        }
    }

    info!("STOPPING PROGRAM...");
    cancel.cancel();
    if processing.join().is_err() {
        error!("processing thread panicked");
    }
    Ok(())
}
