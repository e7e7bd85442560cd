//! `docbind bind` -- create or replace a binding and save the settings.

use anyhow::{Context, Result};
use serde_json::json;

use docbind_core::{Binding, ChartSpec, ChartType};

use crate::cli::{BindArgs, BindCommands, ChartFieldArgs};
use crate::context::RuntimeContext;
use crate::output::{binding_detail, output_json};

pub fn run(ctx: &RuntimeContext, args: &BindArgs) -> Result<()> {
    let mut pipeline = ctx.pipeline();
    pipeline.startup(None).context("failed to load settings")?;

    let (name, binding) = match &args.command {
        BindCommands::Fixed { name, value } => (name, Binding::fixed(value.clone())),
        BindCommands::Formula { name, expression } => {
            (name, Binding::formula(expression.trim()))
        }
        BindCommands::Chart {
            name,
            fields,
            check_columns,
        } => {
            if *check_columns {
                pipeline
                    .columns()
                    .context("failed to fetch columns from the backend")?;
            }
            (name, Binding::chart(chart_spec(fields)))
        }
    };

    pipeline.set_binding(name, binding.clone())?;
    pipeline.save_settings().context("failed to save settings")?;

    if ctx.json {
        output_json(&json!({
            "variable": name,
            "binding": binding,
        }));
    } else {
        println!("Bound {name} ({}): {}", binding.type_name(), binding_detail(&binding));
    }
    Ok(())
}

pub fn chart_spec(fields: &ChartFieldArgs) -> ChartSpec {
    ChartSpec {
        x_field: fields.x.trim().to_string(),
        y_field: fields.y.trim().to_string(),
        chart_type: ChartType::from(fields.chart_type.trim()),
        title: fields.title.clone(),
    }
}
