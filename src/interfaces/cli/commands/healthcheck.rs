//! Container health probe
//!
//! 运行镜像中没有 curl，HEALTHCHECK 通过该命令访问 `/health`。

use std::time::Duration;

use colored::Colorize;
use ureq::Agent;

use crate::interfaces::cli::CliError;

/// 根据配置的端口得到默认探测地址
pub fn default_health_url() -> String {
    let port = crate::config::get_config().server.port;
    format!("http://127.0.0.1:{}/health", port)
}

fn probe(url: &str, timeout_secs: u64) -> Result<String, CliError> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs.max(1))))
        .build()
        .into();

    let resp = agent
        .get(url)
        .call()
        .map_err(|e| CliError::CommandError(format!("Health probe to {} failed: {}", url, e)))?;

    let json: serde_json::Value = resp
        .into_body()
        .read_json()
        .map_err(|e| CliError::ParseError(format!("Invalid health response: {}", e)))?;

    match json["status"].as_str() {
        Some("healthy") => Ok("healthy".to_string()),
        other => Err(CliError::CommandError(format!(
            "Service reported status {:?}",
            other.unwrap_or("unknown")
        ))),
    }
}

pub async fn healthcheck(url: Option<String>, timeout_secs: u64) -> Result<(), CliError> {
    let url = url.unwrap_or_else(default_health_url);
    let status = tokio::task::spawn_blocking(move || probe(&url, timeout_secs))
        .await
        .map_err(|e| CliError::CommandError(format!("Health probe task failed: {}", e)))??;
    println!("{} {}", "Service is".green(), status.green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_fails() {
        // 端口 1 上不会有服务监听
        let result = healthcheck(Some("http://127.0.0.1:1/health".to_string()), 1).await;
        assert!(result.is_err());
    }
}
