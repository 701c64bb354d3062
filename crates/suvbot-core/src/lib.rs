//! Core domain + application logic for the water-delivery order bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and SQLite live
//! behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod flow;
pub mod format;
pub mod i18n;
pub mod keyboards;
pub mod lifecycle;
pub mod logging;
pub mod messaging;
pub mod notify;
pub mod phone;
pub mod repo;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::{Error, Result};
