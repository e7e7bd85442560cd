//! `docbind columns` -- list dataset columns.

use anyhow::{Context, Result};

use docbind_backend::ReportBackend;

use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let columns = ctx
        .backend()
        .columns()
        .context("failed to fetch columns from the backend")?;

    if ctx.json {
        output_json(&columns);
    } else {
        for column in &columns {
            println!("{column}");
        }
    }
    Ok(())
}
