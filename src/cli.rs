//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// DocVault - role-based file storage service
#[derive(Parser, Debug)]
#[command(name = "docvault")]
#[command(version)]
#[command(about = "Role-based file storage REST API", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Probe GET /health of a running server; exits 0 when healthy
    Healthcheck {
        /// Health endpoint URL (default: http://127.0.0.1:<server.port>/health)
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Manage user accounts directly in the database
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// User management commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account (the department is created when missing)
    Create {
        username: String,

        /// Role: USER, MANAGER or ADMIN
        #[arg(long, default_value = "USER")]
        role: String,

        /// Department name
        #[arg(long)]
        department: String,

        /// Password (if not provided, will prompt interactively)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// List all accounts
    List,
}

impl Cli {
    /// 是否以服务器模式运行
    pub fn is_server_mode(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_server_mode() {
        let cli = Cli::try_parse_from(["docvault"]).unwrap();
        assert!(cli.is_server_mode());

        let cli = Cli::try_parse_from(["docvault", "-c", "prod.toml", "serve"]).unwrap();
        assert!(cli.is_server_mode());
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
    }

    #[test]
    fn test_healthcheck_args() {
        let cli =
            Cli::try_parse_from(["docvault", "healthcheck", "--url", "http://x/health"]).unwrap();
        match cli.command {
            Some(Commands::Healthcheck { url, timeout }) => {
                assert_eq!(url.as_deref(), Some("http://x/health"));
                assert_eq!(timeout, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_user_create_requires_department() {
        assert!(Cli::try_parse_from(["docvault", "user", "create", "alice"]).is_err());
        let cli = Cli::try_parse_from([
            "docvault",
            "user",
            "create",
            "alice",
            "--department",
            "legal",
            "--role",
            "MANAGER",
        ])
        .unwrap();
        assert!(!cli.is_server_mode());
    }

    #[test]
    fn test_user_create_stdin_flag() {
        let cli = Cli::try_parse_from([
            "docvault",
            "user",
            "create",
            "bob",
            "--department",
            "dept1",
            "--stdin",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::User {
                action:
                    UserCommands::Create {
                        password, stdin, ..
                    },
            }) => {
                assert!(stdin);
                assert!(password.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
