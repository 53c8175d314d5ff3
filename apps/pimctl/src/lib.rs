//! pimctl CLI library
//!
//! The binary in `main.rs` is a thin wrapper; commands, configuration and
//! output live here so they can be tested directly.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod interactive;
pub mod output;
pub mod preflight;
