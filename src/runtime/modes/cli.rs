//! CLI mode
//!
//! Delegates to the command implementations in `interfaces::cli`.

use crate::cli::Commands;
use crate::interfaces::cli::CliError;

/// Run a one-shot CLI command
pub async fn run_cli(cmd: Commands) -> Result<(), CliError> {
    crate::interfaces::cli::run_cli_command(cmd).await
}
