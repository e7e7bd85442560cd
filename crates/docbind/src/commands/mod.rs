//! Command handlers, one module per subcommand.

pub mod bind;
pub mod columns;
pub mod config_cmd;
pub mod export;
pub mod preview;
pub mod quick_edit;
pub mod settings;
pub mod template;
