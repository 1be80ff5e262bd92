//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands, UserCommands};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::VaultError> for CliError {
    fn from(err: crate::errors::VaultError) -> Self {
        match err {
            crate::errors::VaultError::Validation(msg)
            | crate::errors::VaultError::Conflict(msg) => CliError::CommandError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server runtime".to_string(),
        )),
        Commands::Healthcheck { url, timeout } => commands::healthcheck(url, timeout).await,
        Commands::Config {
            action: ConfigCommands::Generate { output, force },
        } => commands::config_generate(output, force),
        Commands::User { action } => {
            let storage = crate::storage::StorageFactory::create()
                .await
                .map_err(|e| CliError::StorageError(e.to_string()))?;
            match action {
                UserCommands::Create {
                    username,
                    role,
                    department,
                    password,
                    stdin,
                } => {
                    let password = commands::get_password(password, stdin)?;
                    commands::create_user(&storage, username, &role, &department, password).await
                }
                UserCommands::List => commands::list_users(&storage).await,
            }
        }
    }
}
