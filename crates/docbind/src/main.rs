//! `docbind` -- bind report variables to data and render previews.
//!
//! Parses CLI arguments with clap, resolves the runtime context (config,
//! `.docbind` directory, settings store) and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.global.verbose);

    let result = match cli.command {
        Some(command) => {
            RuntimeContext::from_global_args(&cli.global).and_then(|ctx| dispatch(&ctx, &command))
        }
        None => {
            // No subcommand -- print help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    // Handle errors: print message and exit with code 1
    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` takes precedence; `--verbose` alone
/// enables debug output for the docbind crates.
fn init_logging(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("docbind=debug"),
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(ctx: &RuntimeContext, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::Columns => commands::columns::run(ctx),
        Commands::Preview(args) => commands::preview::run(ctx, args),
        Commands::Bind(args) => commands::bind::run(ctx, args),
        Commands::QuickEdit(args) => commands::quick_edit::run(ctx, args),
        Commands::Export(args) => commands::export::run(ctx, args),
        Commands::Settings(args) => commands::settings::run(ctx, args),
        Commands::Template(args) => commands::template::run(ctx, args),
        Commands::Config(args) => commands::config_cmd::run(ctx, args),
    }
}
