//! Tool management and execution framework for invest-agent-rs
//!
//! This crate provides a framework for defining and executing tools (functions)
//! that an external agent runtime can list and call with JSON arguments.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Result, ToolError};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition, parse_params};
