use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use docvault::cli::Cli;
use docvault::config::{get_config, init_config, validators::validate_static_config};

#[actix_web::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_config(cli.config.as_deref());

    if !cli.is_server_mode() {
        let Some(cmd) = cli.command else {
            return ExitCode::FAILURE;
        };
        return match docvault::runtime::modes::run_cli(cmd).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_colored());
                ExitCode::FAILURE
            }
        };
    }

    let config = get_config();
    if let Err(problems) = validate_static_config(&config) {
        for problem in problems {
            eprintln!("{} {}", "[ERROR]".red().bold(), problem);
        }
        return ExitCode::FAILURE;
    }

    let _guard = match docvault::system::logging::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match docvault::runtime::modes::run_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
