//! 文件端点：上传、列表、详情、下载、删除

use std::str::FromStr;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpResponse, web};
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, warn};

use crate::api::middleware::CurrentUser;
use crate::errors::VaultError;
use crate::services::FileService;
use crate::storage::Visibility;

use super::helpers::{api_result, error_from_vault, success_response};
use super::types::{FileListResponse, FileResponse, MessageResponse, UploadQuery};

/// 下载分块大小
const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// 表单字段值上限（visibility 等短字段）
const MAX_TEXT_FIELD_LEN: usize = 64;

/// 上传文件（multipart 字段 `file`，可选字段 `visibility` 覆盖查询参数）
pub async fn upload_file(
    user: CurrentUser,
    files: web::Data<Arc<FileService>>,
    query: web::Query<UploadQuery>,
    mut payload: Multipart,
) -> HttpResponse {
    let mut visibility = query.into_inner().visibility.unwrap_or_default();
    let mut staged = None;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to parse multipart field: {}", e);
                return error_from_vault(&VaultError::invalid_multipart(format!(
                    "Invalid multipart data: {}",
                    e
                )));
            }
        };

        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" if staged.is_none() => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("")
                    .to_string();

                let mut sink = match files.begin_upload(&user).await {
                    Ok(sink) => sink,
                    Err(e) => return error_from_vault(&e),
                };

                while let Some(chunk) = field.next().await {
                    let chunk = match chunk {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            warn!("Failed to read upload chunk: {}", e);
                            return error_from_vault(&VaultError::invalid_multipart(format!(
                                "Failed to read file: {}",
                                e
                            )));
                        }
                    };
                    if let Err(e) = sink.write_chunk(&chunk).await {
                        return error_from_vault(&e);
                    }
                }
                staged = Some((sink, filename));
            }
            "visibility" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    match chunk {
                        Ok(bytes) if raw.len() + bytes.len() <= MAX_TEXT_FIELD_LEN => {
                            raw.extend_from_slice(&bytes)
                        }
                        Ok(_) => {
                            return error_from_vault(&VaultError::validation(
                                "visibility field is too long",
                            ));
                        }
                        Err(e) => {
                            return error_from_vault(&VaultError::invalid_multipart(format!(
                                "Invalid multipart data: {}",
                                e
                            )));
                        }
                    }
                }
                let raw = String::from_utf8_lossy(&raw);
                visibility = match Visibility::from_str(raw.trim()) {
                    Ok(v) => v,
                    Err(_) => {
                        return error_from_vault(&VaultError::validation(format!(
                            "Invalid visibility '{}', expected PRIVATE, DEPARTMENT or PUBLIC",
                            raw.trim()
                        )));
                    }
                };
            }
            _ => {
                // 丢弃多余的文件与未知字段
                while let Some(chunk) = field.next().await {
                    if chunk.is_err() {
                        break;
                    }
                }
            }
        }
    }

    let Some((sink, filename)) = staged else {
        return error_from_vault(&VaultError::invalid_multipart(
            "Missing multipart field 'file'",
        ));
    };

    api_result(
        files
            .finalize_upload(&user, sink, &filename, visibility)
            .await
            .map(FileResponse::from),
    )
}

/// 当前用户可见的文件
pub async fn list_files(user: CurrentUser, files: web::Data<Arc<FileService>>) -> HttpResponse {
    match files.list_files(&user).await {
        Ok(list) => {
            let files: Vec<FileResponse> = list.into_iter().map(FileResponse::from).collect();
            debug!("Listing {} files for '{}'", files.len(), user.username);
            success_response(FileListResponse {
                total: files.len(),
                files,
            })
        }
        Err(e) => error_from_vault(&e),
    }
}

pub async fn get_file(
    user: CurrentUser,
    files: web::Data<Arc<FileService>>,
    path: web::Path<i32>,
) -> HttpResponse {
    api_result(
        files
            .get_file(&user, path.into_inner())
            .await
            .map(FileResponse::from),
    )
}

/// 以 64 KiB 分块流式返回文件内容
pub async fn download_file(
    user: CurrentUser,
    files: web::Data<Arc<FileService>>,
    path: web::Path<i32>,
) -> HttpResponse {
    let (record, handle) = match files.open_for_download(&user, path.into_inner()).await {
        Ok(opened) => opened,
        Err(e) => return error_from_vault(&e),
    };

    let length = handle.metadata().await.ok().map(|m| m.len());
    let file_id = record.id;

    let body = stream::unfold(Some(handle), move |state| async move {
        let mut file = state?;
        let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok::<Bytes, actix_web::Error>(Bytes::from(buf)), Some(file)))
            }
            Err(e) => {
                error!("Failed to read file {} while streaming: {}", file_id, e);
                Some((Err(actix_web::error::ErrorInternalServerError(e)), None))
            }
        }
    });

    let mut builder = HttpResponse::Ok();
    builder
        .content_type("application/octet-stream")
        .insert_header(attachment_disposition(&record.filename));
    if let Some(len) = length {
        builder.no_chunking(len);
    }
    builder.streaming(body)
}

/// `attachment`，非 ASCII 文件名额外附带 RFC 5987 `filename*`
fn attachment_disposition(filename: &str) -> ContentDisposition {
    let mut parameters = vec![DispositionParam::Filename(filename.to_string())];
    if !filename.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        }));
    }
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

pub async fn delete_file(
    user: CurrentUser,
    files: web::Data<Arc<FileService>>,
    path: web::Path<i32>,
) -> HttpResponse {
    api_result(
        files
            .delete_file(&user, path.into_inner())
            .await
            .map(|_| MessageResponse {
                message: "File deleted successfully".to_string(),
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_filename_has_plain_param_only() {
        let cd = attachment_disposition("report.pdf");
        assert_eq!(cd.parameters.len(), 1);
        assert_eq!(cd.get_filename(), Some("report.pdf"));
        assert!(cd.get_filename_ext().is_none());
    }

    #[test]
    fn test_non_ascii_filename_adds_extended_param() {
        let cd = attachment_disposition("отчёт.pdf");
        let ext = cd.get_filename_ext().expect("filename* present");
        assert_eq!(ext.value, "отчёт.pdf".as_bytes());
        assert_eq!(ext.charset, Charset::Ext("UTF-8".to_string()));
        assert!(
            cd.to_string()
                .contains("filename*=UTF-8''%D0%BE%D1%82%D1%87%D1%91%D1%82.pdf")
        );
    }
}
