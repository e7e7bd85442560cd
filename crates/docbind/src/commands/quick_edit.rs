//! `docbind quick-edit` -- change a chart binding and regenerate the chart.

use anyhow::{Context, Result};
use serde_json::json;

use docbind_pipeline::QuickEdit;

use crate::cli::QuickEditArgs;
use crate::commands::bind::chart_spec;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &QuickEditArgs) -> Result<()> {
    let mut pipeline = ctx.pipeline();
    pipeline
        .startup(args.range.to_range())
        .context("failed to load settings")?;

    let spec = chart_spec(&args.fields);
    let edit = QuickEdit {
        variable: args.name.clone(),
        x_field: spec.x_field,
        y_field: spec.y_field,
        chart_type: spec.chart_type,
        title: spec.title,
        scale: args.scale.unwrap_or(ctx.config.chart.default_scale),
    };
    let scale = edit.scale;
    // A failed regeneration still replaces the binding, so it is saved
    // before the error is reported.
    let revision = pipeline.session().revision();
    let result = pipeline.quick_edit(edit);
    if pipeline.session().revision() != revision {
        pipeline.save_settings().context("failed to save settings")?;
    }
    let artifact = result?;

    if ctx.json {
        output_json(&json!({
            "variable": args.name,
            "binding": pipeline.session().binding(&args.name),
            "scale": scale,
            "artifact": artifact,
        }));
    } else {
        match artifact {
            Some(a) => println!("Regenerated {} at {scale}x: {}", args.name, a.location),
            None => println!("Updated {}", args.name),
        }
    }
    Ok(())
}
