//! Event coordination core of the Island.
//!
//! This crate holds the two in-process buses (agent events and Island
//! topics), the cross-process forwarder, the repository traits (ports) the
//! infrastructure layer implements, and the handlers that keep those
//! repositories in step with what agents report. It depends only on
//! `island-types` -- never on `island-infra`.

pub mod event;
pub mod facade;
pub mod handler;
pub mod island_event;
pub mod island_handler;
pub mod periodic;
pub mod repository;
pub mod service;
pub mod setup;

#[cfg(test)]
pub(crate) mod testing;
