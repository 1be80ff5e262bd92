//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;

/// 生成示例配置；未指定路径时输出到 stdout
pub fn config_generate(output: Option<String>, force: bool) -> Result<(), CliError> {
    let Some(path) = output else {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    };

    if !force && Path::new(&path).exists() {
        return Err(CliError::CommandError(format!(
            "File already exists: {} (use --force to overwrite)",
            path
        )));
    }

    StaticConfig::default().save_to_file(&path).map_err(|e| {
        CliError::CommandError(format!("Unable to write configuration file: {}", e))
    })?;

    println!(
        "{} {}",
        "Configuration file generated successfully:".green(),
        path.blue()
    );
    Ok(())
}
