//! `docbind settings` -- inspect or copy the saved bindings.

use std::path::Path;

use anyhow::{bail, Context, Result};

use docbind_backend::{FileSettingsStore, SettingsStore};
use docbind_core::BindingStore;

use crate::cli::{SettingsArgs, SettingsCommands};
use crate::context::RuntimeContext;
use crate::output::{output_bindings, output_json};

pub fn run(ctx: &RuntimeContext, args: &SettingsArgs) -> Result<()> {
    match &args.command {
        SettingsCommands::Show => run_show(ctx),
        SettingsCommands::SaveFile { path } => run_save_file(ctx, path),
    }
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    let settings = ctx
        .settings_store()
        .load_settings()
        .context("failed to load settings")?;

    match settings {
        Some(settings) if ctx.json => output_json(&settings),
        Some(settings) => {
            let store = BindingStore::from(settings.formulas);
            if store.is_empty() {
                println!("Saved settings hold no bindings.");
            } else {
                output_bindings(&store);
            }
        }
        None if ctx.json => output_json(&serde_json::Value::Null),
        None => println!("No saved settings."),
    }
    Ok(())
}

fn run_save_file(ctx: &RuntimeContext, path: &Path) -> Result<()> {
    let Some(settings) = ctx
        .settings_store()
        .load_settings()
        .context("failed to load settings")?
    else {
        bail!("no saved settings to copy");
    };

    FileSettingsStore::new(path)
        .save_settings(&settings)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if ctx.json {
        output_json(&serde_json::json!({
            "path": path.display().to_string(),
            "bindings": settings.formulas.len(),
        }));
    } else {
        println!(
            "Copied {} bindings to {}",
            settings.formulas.len(),
            path.display()
        );
    }
    Ok(())
}
