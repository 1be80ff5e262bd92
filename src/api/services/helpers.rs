//! API 帮助函数

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::VaultError;

use super::error_code::ErrorCode;
use super::types::ErrorBody;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 构建成功响应
pub fn success_response<T: Serialize>(body: T) -> HttpResponse {
    json_response(StatusCode::OK, &body)
}

/// 构建错误响应 `{ code, detail }`
pub fn error_response(status: StatusCode, error_code: ErrorCode, detail: &str) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    builder.append_header(("Content-Type", "application/json; charset=utf-8"));
    if status == StatusCode::UNAUTHORIZED {
        builder.append_header((WWW_AUTHENTICATE, "Bearer"));
    }
    builder.json(ErrorBody {
        code: error_code as i32,
        detail: detail.to_string(),
    })
}

/// 从 VaultError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_vault(err: &VaultError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 VaultError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<VaultError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_vault(&e.into()),
    }
}

impl ResponseError for VaultError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        error_from_vault(self)
    }
}

fn bad_request<E>(err: E, detail: String) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    warn!("Rejected malformed request: {}", detail);
    let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &detail);
    InternalError::from_response(err, response).into()
}

/// JSON / Query / Form / Path 解析失败统一返回 400 + 标准错误体
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let detail = format!("Invalid JSON body: {}", err);
        bad_request(err, detail)
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let detail = format!("Invalid query string: {}", err);
        bad_request(err, detail)
    })
}

pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err: UrlencodedError, _req: &HttpRequest| {
        let detail = format!("Invalid form body: {}", err);
        bad_request(err, detail)
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        let detail = format!("Invalid path parameter: {}", err);
        bad_request(err, detail)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = success_response(serde_json::json!({"status": "healthy"}));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_response_statuses() {
        let response = error_from_vault(&VaultError::not_found("File not found"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_from_vault(&VaultError::payload_too_large("too big"));
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = error_from_vault(&VaultError::unauthorized("Not authenticated"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_api_result_maps_errors() {
        let ok: Result<&str, VaultError> = Ok("fine");
        assert_eq!(api_result(ok).status(), StatusCode::OK);

        let err: Result<(), VaultError> = Err(VaultError::forbidden("nope"));
        assert_eq!(api_result(err).status(), StatusCode::FORBIDDEN);
    }
}
