//! Fetch command implementation.
//!
//! `memeplot fetch <key>` resolves a catalog id, path or URL through the
//! template cache and writes the image bytes to a file.

use std::fs;
use std::path::PathBuf;

use crate::cache::{ImagePayload, TemplateCache, TemplateKey};
use crate::cli::args::FetchArgs;
use crate::config::CacheConfig;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The fetch command implementation.
pub struct FetchCommand {
    cache: TemplateCache,
    args: FetchArgs,
}

impl FetchCommand {
    /// Create a new fetch command.
    pub fn new(config: &CacheConfig, args: FetchArgs) -> Self {
        Self {
            cache: TemplateCache::new(config.clone()),
            args,
        }
    }

    fn output_path(&self, key: &TemplateKey, payload: &ImagePayload) -> PathBuf {
        self.args.output.clone().unwrap_or_else(|| {
            let stem = key.stem();
            let stem = if stem.is_empty() { "template".to_string() } else { stem };
            PathBuf::from(format!("{}.{}", stem, payload.format().extension()))
        })
    }
}

impl Command for FetchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let key = TemplateKey::classify(&self.args.key);
        tracing::debug!("Fetching {} ({})", key, key.kind());

        let payload = self.cache.resolve_with(&key, self.args.refresh)?;
        let path = self.output_path(&key, &payload);
        fs::write(&path, payload.bytes())?;

        let dimensions = payload
            .dimensions()
            .map(|(w, h)| format!(", {}x{}", w, h))
            .unwrap_or_default();
        ui.success(&format!(
            "Saved {} ({}{}, {} bytes)",
            path.display(),
            payload.format(),
            dimensions,
            payload.len()
        ));

        Ok(CommandResult::success())
    }
}
