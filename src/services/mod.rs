//! Service layer for business logic
//!
//! HTTP handlers stay thin; role checks, upload staging and persistence
//! orchestration live here.

pub mod access;
mod auth_service;
mod file_service;
mod seed;
mod user_service;

pub use access::UploadPolicy;
pub use auth_service::*;
pub use file_service::*;
pub use seed::*;
pub use user_service::*;
