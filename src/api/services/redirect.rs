use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, LOCATION, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Utc;
use tracing::{error, instrument};

use super::error_code::ErrorCode;
use super::helpers::error_response;
use crate::services::{RedirectOutcome, RedirectService};
use crate::utils::extract_client_ip;

/// 客户端 IP 提取策略
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpPolicy {
    pub trust_proxy: bool,
}

pub struct RedirectHandler;

impl RedirectHandler {
    #[instrument(skip(req, service, policy), fields(code = %path))]
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<RedirectService>,
        policy: Option<web::Data<ClientIpPolicy>>,
    ) -> impl Responder {
        let code = path.into_inner();
        let trust_proxy = policy.is_some_and(|p| p.trust_proxy);
        let client_ip = extract_client_ip(&req, trust_proxy);
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|h| h.to_str().ok());

        match service
            .resolve(&code, client_ip.as_deref(), user_agent, Utc::now())
            .await
        {
            Ok(RedirectOutcome::Redirect { target })
            | Ok(RedirectOutcome::RedirectOnly { target }) => HttpResponse::Found()
                .insert_header((LOCATION, target))
                .insert_header((CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
                .finish(),
            Ok(RedirectOutcome::NotFound) => {
                error_response(StatusCode::NOT_FOUND, ErrorCode::LinkNotFound, "Not Found")
            }
            Ok(RedirectOutcome::Expired) => {
                error_response(StatusCode::GONE, ErrorCode::LinkExpired, "Link has expired")
            }
            Err(e) => {
                error!("Redirect lookup failed: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal Server Error",
                )
            }
        }
    }
}

/// 公开重定向路由，必须最后注册
pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{code}").route(web::get().to(RedirectHandler::handle_redirect))
}
