//! `docbind config` -- show or initialize configuration.

use anyhow::{bail, Context, Result};

use docbind_config::config::CONFIG_FILE_NAME;
use docbind_config::project_dir::ensure_docbind_dir;
use docbind_config::{save_config, DocbindConfig};

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, render_muted};

pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => run_show(ctx),
        ConfigCommands::Init { force } => run_init(ctx, *force),
    }
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    if ctx.json {
        output_json(&serde_json::json!({
            "docbind_dir": ctx.docbind_dir.as_ref().map(|d| d.display().to_string()),
            "settings_path": ctx.settings_path().display().to_string(),
            "config": ctx.config,
        }));
        return Ok(());
    }

    match &ctx.docbind_dir {
        Some(dir) => println!("{}", render_muted(&format!("# {}", dir.display()))),
        None => println!("{}", render_muted("# no .docbind directory; defaults apply")),
    }
    let text = toml::to_string_pretty(&ctx.config).context("failed to render configuration")?;
    print!("{text}");
    Ok(())
}

fn run_init(ctx: &RuntimeContext, force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let dir = ensure_docbind_dir(&cwd)?;
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    save_config(&dir, &DocbindConfig::default())?;

    if ctx.json {
        output_json(&serde_json::json!({ "path": path.display().to_string() }));
    } else {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
