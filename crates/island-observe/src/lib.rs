//! Observability setup for the Island binary.

pub mod tracing_setup;
