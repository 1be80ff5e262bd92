//! Bearer 鉴权中间件与当前用户提取器

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{Method, header::AUTHORIZATION},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::api::services::error_from_vault;
use crate::errors::VaultError;
use crate::services::AuthService;
use crate::storage::User;

/// 已认证用户，保存在 request extensions 中
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<CurrentUser>().cloned();
        ready(user.ok_or_else(|| VaultError::unauthorized("Not authenticated").into()))
    }
}

/// 从 Authorization header 提取 Bearer token（scheme 不区分大小写）
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// 要求请求携带有效 bearer token 的中间件
#[derive(Clone, Default)]
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn reject(req: ServiceRequest, err: &VaultError) -> ServiceResponse<EitherBody<B>> {
        req.into_response(error_from_vault(err).map_into_right_body())
    }
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        // CORS 预检直接放行
        if req.method() == Method::OPTIONS {
            return Box::pin(async move { srv.call(req).await.map(|r| r.map_into_left_body()) });
        }

        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
            .map(str::to_string);

        let Some(token) = token else {
            debug!("Missing bearer token for {}", req.path());
            let err = VaultError::unauthorized("Not authenticated");
            return Box::pin(async move { Ok(Self::reject(req, &err)) });
        };

        let Some(auth) = req.app_data::<web::Data<Arc<AuthService>>>().cloned() else {
            error!("AuthService is not registered as app data");
            let err = VaultError::internal("authentication is not configured");
            return Box::pin(async move { Ok(Self::reject(req, &err)) });
        };

        Box::pin(async move {
            match auth.resolve_token(&token).await {
                Ok(user) => {
                    trace!("Authenticated '{}' ({})", user.username, user.role);
                    req.extensions_mut().insert(CurrentUser(user));
                    srv.call(req).await.map(|r| r.map_into_left_body())
                }
                Err(e) => Ok(Self::reject(req, &e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
