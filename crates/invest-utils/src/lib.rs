//! Shared utilities for invest-agent-rs
//!
//! This crate provides common functionality used across the workspace:
//! logging setup and loading of `.env` files before configuration is read.

pub mod env;
pub mod logging;

pub use env::load_dotenv;
pub use logging::{LogFormat, init_tracing, init_tracing_with};
