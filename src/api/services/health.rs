use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use chrono::{DateTime, Utc};
use tracing::{error, trace};

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::HealthResponse;
use crate::services::LinkService;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<LinkService>,
        app_start_time: Option<web::Data<AppStartTime>>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let storage_status =
            match tokio::time::timeout(Duration::from_secs(5), service.check_storage()).await {
                Ok(Ok(())) => "healthy".to_string(),
                Ok(Err(e)) => {
                    error!("Storage health check failed: {}", e);
                    "unhealthy".to_string()
                }
                Err(_) => {
                    error!("Storage health check timeout");
                    "timeout".to_string()
                }
            };

        let healthy = storage_status == "healthy";
        let uptime_seconds = app_start_time
            .map(|t| (Utc::now() - t.start_datetime).num_seconds())
            .unwrap_or(0);

        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            storage: storage_status,
            uptime_seconds,
            response_time_ms: start_time.elapsed().as_millis() as u64,
        };

        if healthy {
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(body))
        } else {
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Service Unavailable",
                Some(body),
            )
        }
    }
}

pub fn health_routes() -> actix_web::Resource {
    web::resource("/health").route(web::get().to(HealthService::health_check))
}
