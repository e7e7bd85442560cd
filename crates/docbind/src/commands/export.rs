//! `docbind export` -- filter, then generate and write the final document.

use std::fs;

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::ExportArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let mut pipeline = ctx.pipeline();
    pipeline.startup(None).context("failed to load settings")?;
    pipeline
        .submit_filter(args.range.to_range())
        .context("failed to filter the dataset")?;

    let document = pipeline.export(args.filename.as_deref())?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let path = args.out_dir.join(&document.filename);
    fs::write(&path, &document.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if ctx.json {
        output_json(&json!({
            "path": path.display().to_string(),
            "filename": document.filename,
            "bytes": document.bytes.len(),
        }));
    } else {
        println!("Wrote {} ({} bytes)", path.display(), document.bytes.len());
    }
    Ok(())
}
