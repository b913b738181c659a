//! Cross-process plugin event queues.

pub mod pipe;

pub use pipe::{PipeEventQueue, PipeEventWriter};
