//! movecast-rs library crate
//!
//! This module exposes internal types for integration testing.
//! The main binary is in main.rs.

#[macro_use]
extern crate log;

pub mod arbiter;
pub mod clock;
pub mod commentary;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod engine;
pub mod event;
pub mod net;
pub mod scheduler;
pub mod session;
pub mod sse;
pub mod stdin;
pub mod transcript;

#[cfg(test)]
mod commentary_tests;
#[cfg(test)]
mod decoder_tests;
