//! Forwards events produced in plugin processes onto the agent event bus.
//!
//! Plugins run outside the agent process and push `AgentEvent`s into a
//! process-safe queue. The forwarder drains that queue on a background
//! thread and republishes every event on a `LockingAgentEventQueue`, so
//! forwarded events never race with events published locally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use island_types::event::AgentEvent;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::locking::LockingAgentEventQueue;
use super::queue::AgentEventQueue;

/// Default bound on each receive from the plugin queue. Also the worst-case
/// delay between `stop()` and the worker noticing it.
pub const QUEUE_EVENT_TIMEOUT: Duration = Duration::from_secs(2);

const WORKER_THREAD_NAME: &str = "PluginEventForwarder";

/// Failure to receive from a plugin event queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Nothing arrived within the bound. Not a failure for the forwarder.
    #[error("no plugin event within {0:?}")]
    Timeout(Duration),

    #[error("plugin event queue disconnected")]
    Disconnected,

    #[error("malformed plugin event: {0}")]
    Decode(String),

    #[error("plugin event queue I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receiving end of a queue that plugin processes write events to.
pub trait PluginEventSource: Send + 'static {
    /// Wait at most `timeout` for the next event.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<AgentEvent, QueueError>;
}

impl PluginEventSource for Receiver<AgentEvent> {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<AgentEvent, QueueError> {
        Receiver::recv_timeout(self, timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => QueueError::Timeout(timeout),
            RecvTimeoutError::Disconnected => QueueError::Disconnected,
        })
    }
}

#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("plugin event forwarder is already running")]
    AlreadyRunning,

    #[error("failed to spawn forwarder thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker was signalled but did not finish in time. It keeps
    /// running; calling `stop` again waits for it.
    #[error("forwarder did not stop within {0:?}")]
    StopTimedOut(Duration),

    /// The worker ended because the plugin queue failed.
    #[error("plugin event queue failed: {0}")]
    Queue(#[source] QueueError),

    #[error("forwarder thread panicked; its plugin queue is lost")]
    WorkerPanicked,
}

struct Worker<S> {
    stop: Arc<AtomicBool>,
    done: Receiver<()>,
    handle: JoinHandle<(S, Result<(), QueueError>)>,
}

enum State<S> {
    Stopped(S),
    Running(Worker<S>),
    Lost,
}

/// Drains a [`PluginEventSource`] into a locked agent event bus.
///
/// Only a `LockingAgentEventQueue` is accepted: the worker thread publishes
/// concurrently with the rest of the process.
pub struct PluginEventForwarder<S, Q> {
    agent_event_queue: Arc<LockingAgentEventQueue<Q>>,
    queue_event_timeout: Duration,
    state: State<S>,
}

impl<S, Q> PluginEventForwarder<S, Q>
where
    S: PluginEventSource,
    Q: AgentEventQueue + 'static,
{
    pub fn new(source: S, agent_event_queue: Arc<LockingAgentEventQueue<Q>>) -> Self {
        Self::with_timeout(source, agent_event_queue, QUEUE_EVENT_TIMEOUT)
    }

    pub fn with_timeout(
        source: S,
        agent_event_queue: Arc<LockingAgentEventQueue<Q>>,
        queue_event_timeout: Duration,
    ) -> Self {
        Self {
            agent_event_queue,
            queue_event_timeout,
            state: State::Stopped(source),
        }
    }

    /// Spawn the worker thread. Events already waiting in the queue are
    /// delivered once it runs.
    pub fn start(&mut self) -> Result<(), ForwarderError> {
        let source = match std::mem::replace(&mut self.state, State::Lost) {
            State::Stopped(source) => source,
            State::Running(worker) => {
                self.state = State::Running(worker);
                return Err(ForwarderError::AlreadyRunning);
            }
            State::Lost => return Err(ForwarderError::WorkerPanicked),
        };

        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done) = mpsc::sync_channel(1);
        let queue = Arc::clone(&self.agent_event_queue);
        let timeout = self.queue_event_timeout;
        let worker_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut source = source;
                let result = run(&mut source, &queue, timeout, &worker_stop);
                let _ = done_tx.send(());
                (source, result)
            })
            .map_err(ForwarderError::Spawn)?;

        info!(timeout_ms = timeout.as_millis() as u64, "plugin event forwarder started");
        self.state = State::Running(Worker { stop, done, handle });
        Ok(())
    }

    /// Signal the worker and wait for it to finish.
    ///
    /// With `None` this blocks until the worker exits, which takes at most
    /// one queue timeout. With `Some(timeout)` it gives up after `timeout`
    /// and returns `StopTimedOut`. Once this returns `Ok`, no further events
    /// are forwarded and the forwarder can be started again.
    ///
    /// If the worker had already ended because the queue failed, that
    /// failure is returned here.
    pub fn stop(&mut self, timeout: Option<Duration>) -> Result<(), ForwarderError> {
        let worker = match std::mem::replace(&mut self.state, State::Lost) {
            State::Running(worker) => worker,
            other => {
                self.state = other;
                return Ok(());
            }
        };

        worker.stop.store(true, Ordering::Release);

        if let Some(timeout) = timeout {
            match worker.done.recv_timeout(timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "plugin event forwarder did not stop in time"
                    );
                    self.state = State::Running(worker);
                    return Err(ForwarderError::StopTimedOut(timeout));
                }
            }
        }

        match worker.handle.join() {
            Ok((source, result)) => {
                self.state = State::Stopped(source);
                info!("plugin event forwarder stopped");
                result.map_err(ForwarderError::Queue)
            }
            Err(_) => {
                error!("plugin event forwarder thread panicked");
                Err(ForwarderError::WorkerPanicked)
            }
        }
    }

    /// Whether the worker thread is alive. A worker that ended on a queue
    /// failure reports `false` until `stop` collects the failure.
    pub fn is_running(&self) -> bool {
        matches!(&self.state, State::Running(worker) if !worker.handle.is_finished())
    }
}

impl<S, Q> Drop for PluginEventForwarder<S, Q> {
    // The worker is detached, not joined: it exits on its next poll.
    fn drop(&mut self) {
        if let State::Running(worker) = &self.state {
            worker.stop.store(true, Ordering::Release);
        }
    }
}

fn run<S, Q>(
    source: &mut S,
    queue: &LockingAgentEventQueue<Q>,
    timeout: Duration,
    stop: &AtomicBool,
) -> Result<(), QueueError>
where
    S: PluginEventSource,
    Q: AgentEventQueue,
{
    while !stop.load(Ordering::Acquire) {
        match source.recv_timeout(timeout) {
            Ok(event) => {
                debug!(kind = %event.kind(), agent_id = %event.source(), "forwarding plugin event");
                if let Err(err) = queue.publish(&event) {
                    warn!(error = %err, "subscriber failed on forwarded plugin event");
                }
            }
            Err(QueueError::Timeout(_)) => {}
            Err(err) => {
                error!(error = %err, "plugin event queue failed, forwarder exiting");
                return Err(err);
            }
        }
    }
    Ok(())
}
