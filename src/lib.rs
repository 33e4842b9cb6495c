//! Configuration layer for the trading evolution engine.
//!
//! Settings are read from the environment (after an optional `.env` file),
//! overlaid with the `research` section of `config.yaml`, validated, and then
//! frozen in an [`AppConfig`] handed out by a [`ConfigStore`].

pub mod config;
pub mod error;

pub use crate::config::{AppConfig, ConfigLoader, ConfigStore};
pub use crate::error::{Result, TradevoError};
