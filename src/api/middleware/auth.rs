use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{error, info, trace};

use crate::api::jwt::JwtService;
use crate::api::services::{ErrorCode, error_response};

/// Owner id taken from a validated bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub String);

impl AuthenticatedOwner {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AuthenticatedOwner {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 只在 OwnerAuth 包裹的路由上可用
        let owner = req.extensions().get::<AuthenticatedOwner>().cloned();
        ready(owner.ok_or_else(|| actix_web::error::ErrorUnauthorized("Unauthorized")))
    }
}

/// Bearer JWT authentication middleware
#[derive(Clone)]
pub struct OwnerAuth;

impl<S, B> Transform<S, ServiceRequest> for OwnerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = OwnerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OwnerAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct OwnerAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> OwnerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<EitherBody<B>> {
        info!("Owner authentication failed: {}", message);
        req.into_response(
            error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
                .map_into_right_body(),
        )
    }

    /// 从 Authorization header 提取 Bearer token
    fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl<S, B> Service<ServiceRequest> for OwnerAuthMiddleware<S>
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

        Box::pin(async move {
            // CORS 预检放行
            if req.method() == Method::OPTIONS {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let Some(jwt) = req.app_data::<web::Data<JwtService>>().cloned() else {
                error!("JwtService not registered as app data");
                return Ok(req.into_response(
                    error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Authentication unavailable",
                    )
                    .map_into_right_body(),
                ));
            };

            let Some(token) = Self::extract_bearer_token(&req) else {
                return Ok(Self::handle_unauthorized(req, "Missing bearer token"));
            };

            match jwt.validate(&token) {
                Ok(claims) => {
                    trace!("Bearer token accepted for owner {}", claims.sub);
                    req.extensions_mut()
                        .insert(AuthenticatedOwner(claims.sub));
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(e) => {
                    trace!("Bearer token rejected: {}", e);
                    Ok(Self::handle_unauthorized(req, "Invalid or expired token"))
                }
            }
        })
    }
}
