//! Background thread that calls a function on a fixed period.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PeriodicError {
    #[error("periodic caller '{0}' is already running")]
    AlreadyRunning(String),

    #[error("failed to spawn periodic caller thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("periodic caller '{name}' did not stop within {timeout:?}")]
    StopTimedOut { name: String, timeout: Duration },
}

struct Worker {
    stop: Sender<()>,
    done: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

/// Calls `callback` every `period` until stopped.
///
/// The first call happens one period after `start`. `stop` interrupts the
/// wait immediately; a call already in progress is allowed to finish.
pub struct PeriodicCaller {
    name: String,
    period: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
    worker: Option<Worker>,
}

impl PeriodicCaller {
    pub fn new<F>(name: impl Into<String>, period: Duration, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            period,
            callback: Arc::new(callback),
            worker: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self) -> Result<(), PeriodicError> {
        if self.worker.is_some() {
            return Err(PeriodicError::AlreadyRunning(self.name.clone()));
        }

        let (stop, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done) = mpsc::sync_channel(1);
        let callback = Arc::clone(&self.callback);
        let period = self.period;
        let name = self.name.clone();

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            debug!(name = %name, "periodic call");
                            callback();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                let _ = done_tx.send(());
            })
            .map_err(PeriodicError::Spawn)?;

        info!(
            name = %self.name,
            period_ms = self.period.as_millis() as u64,
            "periodic caller started"
        );
        self.worker = Some(Worker { stop, done, handle });
        Ok(())
    }

    /// Stop the thread. With `Some(timeout)`, give up waiting after
    /// `timeout`; the thread is then left to exit on its own.
    pub fn stop(&mut self, timeout: Option<Duration>) -> Result<(), PeriodicError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let _ = worker.stop.send(());

        if let Some(timeout) = timeout {
            if let Err(RecvTimeoutError::Timeout) = worker.done.recv_timeout(timeout) {
                warn!(name = %self.name, "periodic caller did not stop in time");
                self.worker = Some(worker);
                return Err(PeriodicError::StopTimedOut {
                    name: self.name.clone(),
                    timeout,
                });
            }
        }

        if worker.handle.join().is_err() {
            warn!(name = %self.name, "periodic caller thread panicked");
        }
        info!(name = %self.name, "periodic caller stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }
}

impl Drop for PeriodicCaller {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            let _ = worker.stop.send(());
        }
    }
}
