//! Clap CLI definitions for the `docbind` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docbind_core::{DateRange, Scale};

/// docbind -- bind report variables to data and render previews.
#[derive(Parser, Debug)]
#[command(
    name = "docbind",
    about = "Bind report variables to data and render previews",
    long_about = "Bind named report variables to fixed text, backend formulas or charts, \
                  preview them against a date-filtered dataset and export the final document.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides backend.url).
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Keep settings in this JSON file instead of the configured store.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the dataset columns known to the backend.
    Columns,

    /// Filter the dataset to a date range and preview every variable.
    Preview(RangeArgs),

    /// Bind a variable to fixed text, a formula or a chart.
    Bind(BindArgs),

    /// Change a chart variable and regenerate its chart.
    QuickEdit(QuickEditArgs),

    /// Generate the final document.
    Export(ExportArgs),

    /// Inspect or copy the saved settings.
    Settings(SettingsArgs),

    /// Work with `{{ name }}` template text.
    Template(TemplateArgs),

    /// Show or initialize configuration.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Shared argument groups
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// First day of the range (inclusive).
    #[arg(long)]
    pub start: String,

    /// Last day of the range (inclusive).
    #[arg(long)]
    pub end: String,
}

impl RangeArgs {
    pub fn to_range(&self) -> DateRange {
        DateRange::new(self.start.clone(), self.end.clone())
    }
}

/// A date range that may be omitted.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionalRangeArgs {
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    #[arg(long, requires = "start")]
    pub end: Option<String>,
}

impl OptionalRangeArgs {
    pub fn to_range(&self) -> Option<DateRange> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(DateRange::new(start.clone(), end.clone())),
            _ => None,
        }
    }
}

/// Chart fields shared by `bind chart` and `quick-edit`.
#[derive(Args, Debug, Clone)]
pub struct ChartFieldArgs {
    /// Field plotted on the x axis.
    #[arg(long)]
    pub x: String,

    /// Field plotted on the y axis.
    #[arg(long)]
    pub y: String,

    /// Chart type (line, bar, hist, pie).
    #[arg(long = "type", default_value = "line")]
    pub chart_type: String,

    /// Chart title. Omit to use the variable name; pass "" for no title.
    #[arg(long)]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// bind
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct BindArgs {
    #[command(subcommand)]
    pub command: BindCommands,
}

#[derive(Subcommand, Debug)]
pub enum BindCommands {
    /// Bind a variable to literal text.
    Fixed {
        name: String,
        value: String,
    },

    /// Bind a variable to a backend formula.
    Formula {
        name: String,
        expression: String,
    },

    /// Bind a variable to a chart.
    Chart {
        name: String,

        #[command(flatten)]
        fields: ChartFieldArgs,

        /// Fetch the column list and reject unknown fields.
        #[arg(long)]
        check_columns: bool,
    },
}

// ---------------------------------------------------------------------------
// quick-edit
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct QuickEditArgs {
    /// Chart variable to edit.
    pub name: String,

    #[command(flatten)]
    pub fields: ChartFieldArgs,

    /// Image scale: 1, 1.5, 3 or 6 (default: chart.default_scale).
    #[arg(long, value_parser = parse_scale)]
    pub scale: Option<Scale>,

    /// Filter before regenerating so the chart uses that range.
    #[command(flatten)]
    pub range: OptionalRangeArgs,
}

fn parse_scale(s: &str) -> Result<Scale, String> {
    s.parse()
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Document file name (default: export.default_filename).
    #[arg(long)]
    pub filename: Option<String>,

    /// Directory to write the document into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// settings
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the saved bindings.
    Show,

    /// Copy the saved bindings into a local JSON file.
    SaveFile {
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// template
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateCommands,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List the `{{ name }}` placeholders in a template text file.
    Vars {
        file: PathBuf,
    },

    /// Substitute resolved values into a template text file.
    ///
    /// With a date range every variable is rendered first; without one only
    /// fixed bindings are substituted.
    Fill {
        file: PathBuf,

        #[command(flatten)]
        range: OptionalRangeArgs,

        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    Show,

    /// Write the default configuration to `.docbind/config.toml`.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}
