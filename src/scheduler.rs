//! One-shot, cancellable wall-clock timers for obstacle clearance.
//!
//! Each timer runs on its own short-lived thread that waits on a
//! cancellation channel. If the wait times out the callback fires; a
//! cancel message or a dropped sender ends the thread without firing.

use crate::debug_timer;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ClearanceTimer {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    deadline: Option<Instant>, // None when the delay runs past what Instant can hold
}

impl ClearanceTimer {
    /// Runs `on_fire` on a timer thread once `delay` has elapsed, unless cancelled first.
    pub fn schedule<F>(delay: Duration, on_fire: F) -> io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let deadline = Instant::now().checked_add(delay);
        let handle = thread::Builder::new()
            .name("clearance-timer".to_string())
            .spawn(move || match cancelled.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    debug_timer!("Timer fired after {:?}", delay);
                    on_fire();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug_timer!("Timer cancelled before firing");
                }
            })?;
        debug_timer!("Scheduled clearance in {:?}", delay);
        Ok(ClearanceTimer {
            cancel: Some(cancel),
            handle: Some(handle),
            deadline,
        })
    }

    /// Stops the timer if it has not fired yet. Never waits for the timer thread.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // A send error means the thread already finished
            let _ = cancel.send(());
        }
        self.handle.take();
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Time left until the deadline; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline
            .map_or(Duration::MAX, |deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for ClearanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
