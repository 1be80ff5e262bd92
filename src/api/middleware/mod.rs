pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, RequireAuth};
pub use request_id::{RequestId, RequestIdMiddleware};
