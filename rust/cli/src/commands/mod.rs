//! Command handler modules for the rangekpi CLI.
//!
//! Each command lives in its own module with a consistent pattern:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Dependency injection: Output streams (`&mut dyn Write`) passed as parameters
//! - Error propagation: All errors propagated via `CliError` enum

mod analyze;
mod cfg;
mod classify;
mod export;
mod report;

pub use analyze::{handle_analyze_command, AnalyzeArgs};
pub use cfg::handle_cfg_command;
pub use classify::handle_classify_command;
pub use export::handle_export_command;
pub use report::handle_report_command;
