use actix_web::HttpResponse;
use serde_json::json;

use super::helpers::success_response;

/// 服务信息与端点索引
pub async fn root_info() -> HttpResponse {
    success_response(json!({
        "message": "File Storage API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/health",
        "endpoints": {
            "auth": "/auth",
            "files": "/files",
            "users": "/users",
            "health": "/health",
        },
    }))
}
