/// ----- SCHEDULER MODULE -----
/// First in, first out queue of trip requests. Any number of threads may
/// enqueue; the controller is the only consumer.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::utilities::request::ElevatorRequest;

pub trait Scheduler: Send + Sync {
    fn enqueue(&self, request: ElevatorRequest);

    /// Removes and returns the oldest request.
    fn get_next(&self) -> Option<ElevatorRequest>;

    /// Returns the oldest request without removing it. A later `get_next` may
    /// see a different request if another consumer got there first.
    fn peek_next(&self) -> Option<ElevatorRequest>;

    fn pending_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct FifoScheduler {
    queue: Mutex<VecDeque<ElevatorRequest>>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        FifoScheduler::default()
    }
}

impl Scheduler for FifoScheduler {
    fn enqueue(&self, request: ElevatorRequest) {
        self.queue.lock().push_back(request);
    }

    fn get_next(&self) -> Option<ElevatorRequest> {
        self.queue.lock().pop_front()
    }

    fn peek_next(&self) -> Option<ElevatorRequest> {
        self.queue.lock().front().copied()
    }

    fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn request(pickup: i32, destination: i32) -> ElevatorRequest {
        ElevatorRequest::new(pickup, destination).unwrap()
    }

    #[test]
    fn first_in_first_out() {
        let scheduler = FifoScheduler::new();
        let (a, b, c) = (request(1, 4), request(6, 2), request(3, 9));
        scheduler.enqueue(a);
        scheduler.enqueue(b);
        scheduler.enqueue(c);
        assert_eq!(scheduler.pending_count(), 3);

        assert_eq!(scheduler.get_next(), Some(a));
        assert_eq!(scheduler.pending_count(), 2);
        assert_eq!(scheduler.get_next(), Some(b));
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.get_next(), Some(c));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn empty_queue_returns_none() {
        let scheduler = FifoScheduler::new();
        assert_eq!(scheduler.get_next(), None);
        assert_eq!(scheduler.peek_next(), None);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn peek_does_not_remove() {
        let scheduler = FifoScheduler::new();
        let (a, b) = (request(2, 5), request(5, 8));
        scheduler.enqueue(a);
        scheduler.enqueue(b);
        assert_eq!(scheduler.peek_next(), Some(a));
        assert_eq!(scheduler.peek_next(), Some(a));
        assert_eq!(scheduler.pending_count(), 2);
        assert_eq!(scheduler.get_next(), Some(a));
        assert_eq!(scheduler.peek_next(), Some(b));
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let scheduler = Arc::new(FifoScheduler::new());
        let handles: Vec<_> = (1..=8)
            .map(|producer| {
                let scheduler = Arc::clone(&scheduler);
                thread::spawn(move || {
                    for destination in 1..=10 {
                        if destination != producer {
                            scheduler.enqueue(request(producer, destination));
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(scheduler.pending_count(), 8 * 9);

        let mut seen = HashSet::new();
        while let Some(request) = scheduler.get_next() {
            assert!(seen.insert(request), "duplicate {request}");
        }
        assert_eq!(seen.len(), 8 * 9);
    }
}
