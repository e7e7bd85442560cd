//! `docbind template` -- placeholder discovery and local substitution.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use docbind_core::template::{extract_variables, fill_template};
use docbind_core::Binding;

use crate::cli::{OptionalRangeArgs, TemplateArgs, TemplateCommands};
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &TemplateArgs) -> Result<()> {
    match &args.command {
        TemplateCommands::Vars { file } => run_vars(ctx, file),
        TemplateCommands::Fill {
            file,
            range,
            output,
        } => run_fill(ctx, file, range, output.as_deref()),
    }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run_vars(ctx: &RuntimeContext, file: &Path) -> Result<()> {
    let variables = extract_variables(&read_template(file)?);
    if ctx.json {
        output_json(&variables);
    } else {
        for name in &variables {
            println!("{name}");
        }
    }
    Ok(())
}

fn run_fill(
    ctx: &RuntimeContext,
    file: &Path,
    range: &OptionalRangeArgs,
    output: Option<&Path>,
) -> Result<()> {
    let text = read_template(file)?;
    let mut pipeline = ctx.pipeline();
    let report = pipeline
        .startup(range.to_range())
        .context("failed to load settings")?;

    let values: HashMap<String, String> = if report.filtered {
        pipeline.session().display().text_values()
    } else {
        pipeline
            .session()
            .store()
            .iter()
            .filter_map(|(name, binding)| match binding {
                Binding::Fixed { value } => Some((name.to_string(), value.clone())),
                Binding::Formula { .. } | Binding::Chart(_) => None,
            })
            .collect()
    };
    let filled = fill_template(&text, &values);

    match output {
        Some(path) => {
            fs::write(path, &filled)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if ctx.json {
                output_json(&json!({ "path": path.display().to_string() }));
            } else {
                println!("Wrote {}", path.display());
            }
        }
        None if ctx.json => output_json(&json!({ "text": filled })),
        None => print!("{filled}"),
    }
    Ok(())
}
