//! # PACER Core Library
//!
//! Game-agnostic pacing layer for server-driven bot characters.
//!
//! A host game loop that drives thousands of bots cannot afford to run full
//! AI for every bot on every tick. PACER derives a coarse **budget tier**
//! (`Full`, `Reduced`, `Minimal`) from each bot's current lifestyle role and
//! uses that single signal to coordinate two cross-cutting policies:
//!
//! - **Work scope** — which AI phases run inside a tick ([`Scheduler`]).
//! - **Save cadence** — how often the bot's durable state is written back,
//!   and whether a given save opportunity is worth a write at all
//!   ([`SaveController`]).
//!
//! The crate owns no thread, no timer, and no storage. The host invokes it
//! through a handful of synchronous hooks and keeps the per-bot save
//! countdown on its side; PACER only decides and re-arms.
//!
//! ## Performance Contract
//!
//! All operations are designed for per-tick use on the game loop thread:
//! - Role classification: branch table, no allocation
//! - Phase gating: bit test per phase
//! - Snapshot capture + comparison: < 5μs for a typical equipment/quest set
//! - Save decision: one registry lookup plus a snapshot compare

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod phase;
pub mod save;
pub mod schedule;
pub mod snapshot;
pub mod tier;
pub mod types;

pub use config::PacerConfig;
pub use error::PacerError;
pub use save::SaveController;
pub use schedule::Scheduler;
pub use tier::{Tier, classify};
pub use types::*;
