//! `docbind preview` -- filter, render and show every variable.

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::RangeArgs;
use crate::context::RuntimeContext;
use crate::output::{output_display, output_json, render_muted};

pub fn run(ctx: &RuntimeContext, args: &RangeArgs) -> Result<()> {
    let mut pipeline = ctx.pipeline();
    let report = pipeline.startup(None).context("failed to load settings")?;
    pipeline
        .submit_filter(args.to_range())
        .context("preview failed")?;

    let session = pipeline.session();
    let rows = session.dataset().map_or(0, |d| d.len());

    if ctx.json {
        output_json(&json!({
            "range": session.range(),
            "rows": rows,
            "settings_loaded": report.settings_loaded,
            "variables": session.display(),
        }));
        return Ok(());
    }

    println!(
        "{}",
        render_muted(&format!("{} .. {}: {rows} rows", args.start, args.end))
    );
    if rows == 0 {
        println!("No records in range; nothing rendered.");
    } else if !report.settings_loaded {
        println!("No saved bindings; only the date variables are set.");
    }
    output_display(session.display());
    Ok(())
}
