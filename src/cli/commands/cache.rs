//! Cache command implementation.
//!
//! Provides `memeplot cache stats` and `memeplot cache clear`.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cache::{format_duration, DiskStore, Freshness, TemplateCache};
use crate::config::CacheConfig;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// Show cache location, size and catalog age.
    Stats,
    /// Delete the cached catalog and every cached image.
    Clear,
}

/// The cache command implementation.
pub struct CacheCommand {
    config: CacheConfig,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(config: &CacheConfig, args: CacheArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let exit_code = match &self.args.command {
            CacheSubcommand::Stats => show_stats(&self.config, ui)?,
            CacheSubcommand::Clear => {
                let removed = TemplateCache::new(self.config.clone()).clear()?;
                ui.success(&format!("Cleared {} cached images", removed));
                0
            }
        };

        Ok(if exit_code == 0 {
            CommandResult::success()
        } else {
            CommandResult::failure(exit_code)
        })
    }
}

fn show_stats(config: &CacheConfig, ui: &mut dyn UserInterface) -> Result<i32> {
    let store = DiskStore::new(config.resolved_cache_dir());
    let images = store.list_images()?;
    let total_size = store.total_size()?;

    ui.show_header("Template cache");
    ui.show_field("Location", &store.root().display().to_string());
    ui.show_field("Enabled", if config.cache_enabled { "yes" } else { "no" });
    ui.show_field("Images", &images.len().to_string());
    ui.show_field("Size", &format_size(total_size));

    let catalog = match store.load_catalog() {
        Ok(Some(doc)) => {
            let state = match doc.freshness(config.catalog_ttl) {
                Freshness::Fresh => "fresh",
                Freshness::Stale => "stale",
            };
            format!(
                "{} templates, fetched {} ago ({}, ttl {})",
                doc.len(),
                format_duration(doc.age().max(chrono::Duration::zero())),
                state,
                format_duration(config.catalog_ttl)
            )
        }
        Ok(None) => "not cached".to_string(),
        Err(e) => {
            ui.warning(&e.to_string());
            "corrupt".to_string()
        }
    };
    ui.show_field("Catalog", &catalog);

    Ok(0)
}

/// Human-readable byte count.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
