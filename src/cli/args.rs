//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;
use super::commands::templates::TemplatesArgs;

/// memeplot - meme template catalog and image cache.
#[derive(Debug, Parser)]
#[command(name = "memeplot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default ~/.memeplot/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory (overrides config and MEMEPLOT_CACHE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Template API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Bypass the disk cache for this invocation
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Browse the template catalog
    Templates(TemplatesArgs),

    /// Fetch a template image by id, path or URL
    Fetch(FetchArgs),

    /// Manage the template cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FetchArgs {
    /// Catalog id, local path or http(s) URL
    pub key: String,

    /// Where to write the image (default: <name>.<ext> in the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Skip both cache tiers and fetch again
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
