//! HTTP surface
//!
//! - `/links/**`: owner-scoped link management (Bearer JWT)
//! - `/health`: liveness and storage reachability
//! - `/{code}`: public redirect

pub mod jwt;
pub mod middleware;
pub mod services;

use actix_web::http::StatusCode;
use actix_web::{error, web};

pub use jwt::JwtService;
pub use services::{AppStartTime, ClientIpPolicy};

use services::{ErrorCode, error_response};

/// Register every route; shared data must be registered by the caller
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Invalid JSON body: {}", err),
        );
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Invalid query: {}", err),
        );
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not Found");
        error::InternalError::from_response(err, response).into()
    }))
    .service(services::health_routes())
    .service(services::links_routes().wrap(middleware::OwnerAuth))
    .service(services::redirect_routes());
}
