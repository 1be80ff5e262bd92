//! User account commands

use std::io::{self, BufRead, IsTerminal, Write};
use std::str::FromStr;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::{NewUser, Role, SeaOrmStorage};
use crate::utils::password::hash_password;

/// 从参数、stdin 或交互式提示获取密码
pub fn get_password(password: Option<String>, stdin: bool) -> Result<String, CliError> {
    if stdin {
        read_password_line(io::stdin().lock())
    } else if let Some(pwd) = password {
        Ok(pwd)
    } else {
        prompt_password_with_confirm()
    }
}

fn read_password_line(mut reader: impl BufRead) -> Result<String, CliError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| CliError::CommandError(format!("Failed to read from stdin: {}", e)))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// 交互式输入密码（不回显，需确认）
fn prompt_password_with_confirm() -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::CommandError(
            "No password provided. Use --password or --stdin flag, or run interactively."
                .to_string(),
        ));
    }

    let read = |prompt: &str| -> Result<String, CliError> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        rpassword::read_password()
            .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
    };

    let password = read("Password: ")?;
    let confirm = read("Confirm password: ")?;
    if password != confirm {
        return Err(CliError::CommandError("Passwords do not match".to_string()));
    }
    Ok(password)
}

pub async fn create_user(
    storage: &SeaOrmStorage,
    username: String,
    role: &str,
    department: &str,
    password: String,
) -> Result<(), CliError> {
    let role = Role::from_str(&role.to_uppercase())
        .map_err(|_| CliError::ParseError(format!("Unknown role: {}", role)))?;

    if username.trim().is_empty() || password.is_empty() {
        return Err(CliError::CommandError(
            "Username and password must not be empty".to_string(),
        ));
    }

    let department = storage.get_or_create_department(department).await?;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CliError::CommandError(e.to_string()))?
        .map_err(|e| CliError::CommandError(e.to_string()))?;

    let user = storage
        .create_user(NewUser {
            username,
            password_hash,
            role,
            department_id: department.id,
        })
        .await?;

    println!(
        "{} {} ({}, department {})",
        "Created user".green(),
        user.username.bold(),
        user.role,
        department.name
    );
    Ok(())
}

pub async fn list_users(storage: &SeaOrmStorage) -> Result<(), CliError> {
    let users = storage.list_users().await?;
    if users.is_empty() {
        println!("{}", "No users".yellow());
        return Ok(());
    }
    for user in users {
        println!(
            "{:>5}  {:<24} {:<8} dept={}",
            user.id, user.username, user.role, user.department_id
        );
    }
    Ok(())
}
