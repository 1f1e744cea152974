//! Templates command implementation.
//!
//! Provides `memeplot templates list`, `search`, `show` and `refresh`.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::CacheConfig;
use crate::registry::{TemplateMetadata, TemplateRegistry};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Arguments for the templates command.
#[derive(Debug, Clone, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesSubcommand,
}

/// Templates subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TemplatesSubcommand {
    /// List every template in the catalog.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Search ids, names and keywords (case-insensitive).
    Search {
        query: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one template's metadata.
    Show {
        id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Re-download the catalog regardless of its age.
    Refresh,
}

/// The templates command implementation.
pub struct TemplatesCommand {
    registry: TemplateRegistry,
    args: TemplatesArgs,
}

impl TemplatesCommand {
    /// Create a new templates command.
    pub fn new(config: &CacheConfig, args: TemplatesArgs) -> Self {
        Self {
            registry: TemplateRegistry::from_config(config.clone()),
            args,
        }
    }
}

impl Command for TemplatesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let exit_code = match &self.args.command {
            TemplatesSubcommand::List { json } => {
                let templates = self.registry.list_all()?;
                print_templates(&templates, *json, ui)?
            }
            TemplatesSubcommand::Search { query, json } => {
                let templates = self.registry.search(query)?;
                if templates.is_empty() && !json {
                    ui.warning(&format!("No templates match '{}'", query));
                    1
                } else {
                    print_templates(&templates, *json, ui)?
                }
            }
            TemplatesSubcommand::Show { id, json } => {
                let template = self.registry.get(id)?;
                show_template(&template, *json, ui)?
            }
            TemplatesSubcommand::Refresh => {
                let count = self.registry.refresh()?;
                ui.success(&format!("Catalog refreshed: {} templates", count));
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

fn print_templates(
    templates: &[TemplateMetadata],
    json: bool,
    ui: &mut dyn UserInterface,
) -> Result<i32> {
    if json {
        ui.data(&serde_json::to_string_pretty(templates)?);
        return Ok(0);
    }

    let mut table = Table::new(&["ID", "LINES", "NAME"]);
    for template in templates {
        table.add_row(&[
            template.id.clone(),
            template.line_count().to_string(),
            template.name.clone(),
        ]);
    }

    ui.data(&table.render());
    ui.message(&format!("\n{} templates", templates.len()));
    Ok(0)
}

fn show_template(template: &TemplateMetadata, json: bool, ui: &mut dyn UserInterface) -> Result<i32> {
    if json {
        ui.data(&serde_json::to_string_pretty(template)?);
        return Ok(0);
    }

    ui.show_header(&template.name);
    ui.show_field("ID", &template.id);
    ui.show_field("Lines", &template.line_count().to_string());
    ui.show_field("Image", &template.image_url);
    if !template.keywords.is_empty() {
        ui.show_field("Keywords", &template.keywords.join(", "));
    }
    if !template.example.is_empty() {
        ui.show_field("Example", &template.example.join(" / "));
    }
    Ok(0)
}
