//! API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error_code::ErrorCode;
use crate::services::{CreateLinkRequest, LinkView, UpdateLinkRequest};
use crate::storage::{Link, LinkStatus, VisitEvent};

/// 统一响应包装
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostNewLink {
    #[serde(default)]
    pub original_link: String,
    #[serde(default)]
    pub remark: String,
    pub expire: Option<String>,
}

impl From<PostNewLink> for CreateLinkRequest {
    fn from(body: PostNewLink) -> Self {
        CreateLinkRequest {
            original_link: body.original_link,
            remark: body.remark,
            expire: body.expire,
        }
    }
}

/// PATCH 请求体
///
/// `"expire": null` clears the expiry, a missing key keeps it.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchLink {
    pub original_link: Option<String>,
    pub remark: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub expire: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<PatchLink> for UpdateLinkRequest {
    fn from(body: PatchLink) -> Self {
        UpdateLinkRequest {
            original_link: body.original_link,
            remark: body.remark,
            expire: body.expire.map(Option::unwrap_or_default),
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetLinksQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub original_link: String,
    pub short_link: String,
    pub remark: String,
    pub expire: Option<DateTime<Utc>>,
    pub count: i64,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn at(link: Link, now: DateTime<Utc>) -> Self {
        let status = link.status_at(now);
        Self::with_status(link, status)
    }

    fn with_status(link: Link, status: LinkStatus) -> Self {
        Self {
            id: link.id,
            original_link: link.original_link,
            short_link: link.short_link,
            remark: link.remark,
            expire: link.expire,
            count: link.count,
            status,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

impl From<LinkView> for LinkResponse {
    fn from(view: LinkView) -> Self {
        Self::with_status(view.link, view.status)
    }
}

/// POST /links 的响应数据
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLinkResponse {
    pub short_link: String,
    pub link: LinkResponse,
}

#[derive(Serialize, Clone, Debug)]
pub struct SingleLinkResponse {
    pub link: LinkResponse,
}

#[derive(Serialize, Clone, Debug)]
pub struct DeleteLinkResponse {
    pub deleted: bool,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VisitEventResponse {
    pub id: i64,
    pub link_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: Option<String>,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
    pub time: DateTime<Utc>,
}

impl From<VisitEvent> for VisitEventResponse {
    fn from(event: VisitEvent) -> Self {
        Self {
            id: event.id,
            link_id: event.link_id,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            device_type: event.device_type,
            os_name: event.os_name,
            browser_name: event.browser_name,
            time: event.time,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub uptime_seconds: i64,
    pub response_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_expire_null_vs_missing() {
        let body: PatchLink = serde_json::from_str(r#"{"remark":"x"}"#).unwrap();
        assert!(body.expire.is_none());
        assert!(UpdateLinkRequest::from(body).expire.is_none());

        let body: PatchLink = serde_json::from_str(r#"{"expire":null}"#).unwrap();
        assert_eq!(body.expire, Some(None));
        assert_eq!(UpdateLinkRequest::from(body).expire.as_deref(), Some(""));

        let body: PatchLink = serde_json::from_str(r#"{"expire":"1d"}"#).unwrap();
        assert_eq!(UpdateLinkRequest::from(body).expire.as_deref(), Some("1d"));
    }

    #[test]
    fn test_link_response_is_camel_case() {
        let now = Utc::now();
        let link = Link {
            id: 1,
            owner_id: "alice".to_string(),
            original_link: "https://example.com".to_string(),
            short_link: "http://lp.test/0a1b2c3d".to_string(),
            remark: "docs".to_string(),
            expire: None,
            count: 3,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(LinkResponse::at(link, now)).unwrap();
        assert_eq!(json["originalLink"], "https://example.com");
        assert_eq!(json["shortLink"], "http://lp.test/0a1b2c3d");
        assert_eq!(json["status"], "active");
        assert!(json.get("ownerId").is_none());
    }
}
