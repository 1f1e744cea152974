//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, CacheConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: CacheConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher with an already resolved configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Load configuration (file, environment, then CLI flags) for `cli`.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        Ok(Self::new(apply_cli_overrides(config, cli)))
    }

    /// The effective configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Templates(args) => {
                let cmd = super::templates::TemplatesCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Fetch(args) => {
                let cmd = super::fetch::FetchCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Cache(args) => {
                let cmd = super::cache::CacheCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}

/// Layer global CLI flags over the loaded configuration.
pub fn apply_cli_overrides(mut config: CacheConfig, cli: &Cli) -> CacheConfig {
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(api_base) = &cli.api_base {
        config.api_base = api_base.clone();
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from([
            "memeplot",
            "--cache-dir",
            "/tmp/flag",
            "--api-base",
            "http://flag",
            "--no-cache",
            "cache",
            "stats",
        ]);
        let config = CacheConfig::default().with_cache_dir("/tmp/file");

        let config = apply_cli_overrides(config, &cli);

        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/flag")));
        assert_eq!(config.api_base, "http://flag");
        assert!(!config.cache_enabled);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = Cli::parse_from(["memeplot", "cache", "stats"]);
        let config = CacheConfig::default()
            .with_cache_dir("/tmp/file")
            .with_api_base("http://file");

        let config = apply_cli_overrides(config, &cli);

        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/file")));
        assert_eq!(config.api_base, "http://file");
        assert!(config.cache_enabled);
    }
}
