//! Infrastructure layer for the Island.
//!
//! Contains implementations of the repository traits defined in
//! `island-core` (in-memory, process-lifetime storage), the pipe-backed
//! plugin event queue, and configuration loading.

pub mod config;
pub mod filesystem;
pub mod memory;
pub mod queue;
