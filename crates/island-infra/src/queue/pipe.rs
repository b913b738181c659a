//! Newline-delimited JSON event queue over a byte stream.
//!
//! A plugin child process writes one serialized `AgentEvent` per line to
//! its stdout. `PipeEventQueue` reads those lines on a dedicated thread and
//! hands them to the forwarder through `recv_timeout`.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use island_core::event::{PluginEventSource, QueueError};
use island_types::event::AgentEvent;
use tracing::{debug, warn};

const READER_THREAD_NAME: &str = "PluginEventReader";

/// Receiving end of a plugin's event stream.
///
/// The reader thread stops at end of stream, on a read error, or once this
/// queue is dropped and the next line arrives.
pub struct PipeEventQueue {
    receiver: Receiver<Result<AgentEvent, QueueError>>,
}

impl PipeEventQueue {
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name(READER_THREAD_NAME.to_string())
            .spawn(move || {
                for line in BufReader::new(reader).lines() {
                    let item = match line {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => serde_json::from_str::<AgentEvent>(&line)
                            .map_err(|err| QueueError::Decode(err.to_string())),
                        Err(err) => {
                            warn!(error = %err, "failed to read plugin event stream");
                            let _ = sender.send(Err(QueueError::Io(err)));
                            return;
                        }
                    };
                    if sender.send(item).is_err() {
                        return;
                    }
                }
                debug!("plugin event stream closed");
            })?;
        Ok(Self { receiver })
    }
}

impl PluginEventSource for PipeEventQueue {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<AgentEvent, QueueError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => Err(QueueError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }
}

/// Writing end used by plugins: one JSON document per line, flushed
/// immediately so the Island sees events as they happen.
pub struct PipeEventWriter<W: Write> {
    writer: W,
}

impl<W: Write> PipeEventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn send(&mut self, event: &AgentEvent) -> Result<(), QueueError> {
        serde_json::to_writer(&mut self.writer, event)
            .map_err(|err| QueueError::Decode(err.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
