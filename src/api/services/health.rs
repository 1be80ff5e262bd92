use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

use crate::services::FileService;
use crate::storage::SeaOrmStorage;

use super::helpers::json_response;
use super::types::{HealthChecks, HealthResponse, HealthStorageCheck, HealthUploadsCheck};

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// 上传目录可写检查：创建并删除一个探针文件
async fn probe_upload_dir(dir: &Path) -> Result<(), String> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|e| format!("upload directory unavailable: {}", e))?;
    if !metadata.is_dir() {
        return Err("upload path is not a directory".to_string());
    }

    let probe = dir.join(format!(".health-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| format!("upload directory not writable: {}", e))?;
    if let Err(e) = tokio::fs::remove_file(&probe).await {
        debug!("Failed to remove health probe {}: {}", probe.display(), e);
    }
    Ok(())
}

/// Health Service
///
/// 直接调用 storage 的 count，不经过业务服务层，保证探针响应快。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        files: web::Data<Arc<FileService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = storage.get_backend_config().await.storage_type;

        let storage_status =
            match tokio::time::timeout(STORAGE_CHECK_TIMEOUT, storage.count_files()).await {
                Ok(Ok(count)) => HealthStorageCheck {
                    status: "healthy".to_string(),
                    backend,
                    files_count: Some(count),
                    error: None,
                },
                Ok(Err(e)) => {
                    error!("Storage health check failed: {}", e);
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        files_count: None,
                        error: Some(format!("database error: {}", e.message())),
                    }
                }
                Err(_) => {
                    error!("Storage health check timeout");
                    HealthStorageCheck {
                        status: "unhealthy".to_string(),
                        backend,
                        files_count: None,
                        error: Some("timeout".to_string()),
                    }
                }
            };

        let upload_dir = files.upload_dir();
        let uploads_status = match probe_upload_dir(upload_dir).await {
            Ok(()) => HealthUploadsCheck {
                status: "healthy".to_string(),
                dir: upload_dir.display().to_string(),
                error: None,
            },
            Err(e) => {
                error!("Uploads health check failed: {}", e);
                HealthUploadsCheck {
                    status: "unhealthy".to_string(),
                    dir: upload_dir.display().to_string(),
                    error: Some(e),
                }
            }
        };

        let is_healthy = storage_status.status == "healthy" && uploads_status.status == "healthy";
        let now = chrono::Utc::now();

        let health_data = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
            checks: HealthChecks {
                storage: storage_status,
                uploads: uploads_status,
            },
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        debug!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            health_data.status
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status, &health_data)
    }

    // 简单的就绪检查，只返回 200 状态码
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
