//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which builds the
//! effective [`CacheConfig`](crate::config::CacheConfig) once and routes CLI
//! subcommands to their implementations.

pub mod cache;
pub mod completions;
pub mod dispatcher;
pub mod fetch;
pub mod templates;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
