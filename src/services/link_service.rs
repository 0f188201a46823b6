//! Link management service
//!
//! Create / update / delete / list for an owner's links. The redirect path
//! lives in [`RedirectService`](super::RedirectService).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::code_generator::CodeGenerator;
use super::pagination::{Page, normalize_page};
use crate::config::LinkSettings;
use crate::errors::{LinkpulseError, Result};
use crate::storage::{
    AnalyticsStore, Link, LinkFilter, LinkPatch, LinkStatus, LinkStore, NewLink,
};
use crate::utils::{TimeParser, validate_url};

// ============ Request/Response DTOs ============

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    pub original_link: String,
    pub remark: String,
    /// RFC3339 or relative ("1h", "7d", "1d2h")
    pub expire: Option<String>,
}

/// Request to update an existing link; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkRequest {
    pub original_link: Option<String>,
    pub remark: Option<String>,
    /// `Some("")` removes the expiry
    pub expire: Option<String>,
}

impl UpdateLinkRequest {
    pub fn is_empty(&self) -> bool {
        self.original_link.is_none() && self.remark.is_none() && self.expire.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// 链接不存在（或不属于该 owner），未执行任何写操作
    NotFound,
}

/// 带状态的链接（列表项）
#[derive(Debug, Clone)]
pub struct LinkView {
    pub link: Link,
    pub status: LinkStatus,
}

pub type LinkPage = Page<LinkView>;

// ============ LinkService Implementation ============

pub struct LinkService {
    links: Arc<dyn LinkStore>,
    analytics: Arc<dyn AnalyticsStore>,
    generator: Arc<dyn CodeGenerator>,
    settings: LinkSettings,
}

impl LinkService {
    pub fn new(
        links: Arc<dyn LinkStore>,
        analytics: Arc<dyn AnalyticsStore>,
        generator: Arc<dyn CodeGenerator>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            links,
            analytics,
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// 存储可达性（健康检查用）
    pub async fn check_storage(&self) -> Result<()> {
        self.links.ping().await
    }

    fn parse_original_link(original_link: &str) -> Result<String> {
        validate_url(original_link)
            .map(str::to_string)
            .map_err(|e| LinkpulseError::validation(e.to_string()))
    }

    fn parse_remark(remark: &str) -> Result<String> {
        let remark = remark.trim();
        if remark.is_empty() {
            return Err(LinkpulseError::validation("remark cannot be empty"));
        }
        Ok(remark.to_string())
    }

    fn parse_expire(expire: Option<&str>, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        match expire.map(str::trim) {
            Some(s) if !s.is_empty() => TimeParser::parse_expire_time_at(s, now)
                .map(Some)
                .map_err(|e| LinkpulseError::validation(format!("invalid expire: {}", e))),
            _ => Ok(None),
        }
    }

    // ============ CRUD Operations ============

    /// Create a new short link with a freshly generated code
    pub async fn create(&self, owner_id: &str, req: CreateLinkRequest) -> Result<Link> {
        let now = Utc::now();
        let original_link = Self::parse_original_link(&req.original_link)?;
        let remark = Self::parse_remark(&req.remark)?;
        let expire = Self::parse_expire(req.expire.as_deref(), now)?;

        let max_attempts = self.settings.max_generation_attempts;
        for attempt in 1..=max_attempts {
            let code = self.generator.generate();
            let short_link = self.settings.short_link_for(&code);

            if self.links.find_by_short_link(&short_link).await?.is_some() {
                debug!(
                    "LinkService: code '{}' already taken (attempt {}/{})",
                    code, attempt, max_attempts
                );
                continue;
            }

            let new_link = NewLink {
                owner_id: owner_id.to_string(),
                original_link: original_link.clone(),
                short_link,
                remark: remark.clone(),
                expire,
                created_at: now,
            };

            match self.links.insert(new_link).await {
                Ok(link) => {
                    info!(
                        "LinkService: created '{}' -> '{}' for owner {}",
                        link.short_link, link.original_link, owner_id
                    );
                    return Ok(link);
                }
                // 并发插入撞上唯一约束，换一个码重试
                Err(e) if e.is_conflict() => {
                    warn!(
                        "LinkService: insert conflict for code '{}' (attempt {}/{})",
                        code, attempt, max_attempts
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(LinkpulseError::exhausted(format!(
            "no unique short code after {} attempts",
            max_attempts
        )))
    }

    /// Update original link / remark / expire of an owned link
    pub async fn update(&self, owner_id: &str, id: i64, req: UpdateLinkRequest) -> Result<Link> {
        if req.is_empty() {
            return Err(LinkpulseError::validation(
                "at least one of originalLink, remark, expire is required",
            ));
        }

        let patch = LinkPatch {
            original_link: req
                .original_link
                .as_deref()
                .map(Self::parse_original_link)
                .transpose()?,
            remark: req.remark.as_deref().map(Self::parse_remark).transpose()?,
            expire: match req.expire.as_deref() {
                Some(expire) => Some(Self::parse_expire(Some(expire), Utc::now())?),
                None => None,
            },
        };

        let link = self
            .links
            .update(owner_id, id, &patch)
            .await?
            .ok_or_else(|| LinkpulseError::not_found(format!("link {} not found", id)))?;

        info!("LinkService: updated link {} for owner {}", id, owner_id);
        Ok(link)
    }

    /// Delete an owned link and all of its visit events
    pub async fn delete(&self, owner_id: &str, id: i64) -> Result<DeleteOutcome> {
        if self.links.find_owned(owner_id, id).await?.is_none() {
            debug!("LinkService: delete of missing link {} ignored", id);
            return Ok(DeleteOutcome::NotFound);
        }

        // 先删访问事件，再删链接
        let removed_events = self.analytics.delete_by_link(id).await?;
        if !self.links.delete(owner_id, id).await? {
            return Ok(DeleteOutcome::NotFound);
        }

        info!(
            "LinkService: deleted link {} and {} visit events",
            id, removed_events
        );
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn get(&self, owner_id: &str, id: i64) -> Result<Link> {
        self.links
            .find_owned(owner_id, id)
            .await?
            .ok_or_else(|| LinkpulseError::not_found(format!("link {} not found", id)))
    }

    /// List an owner's links, newest first
    pub async fn list_by_owner(&self, owner_id: &str, filter: LinkFilter) -> Result<LinkPage> {
        let (page, page_size) = normalize_page(filter.page, filter.page_size);
        let filter = LinkFilter {
            search: filter
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page,
            page_size,
        };

        let (links, total) = self.links.list_by_owner(owner_id, &filter).await?;

        let now = Utc::now();
        let items = links
            .into_iter()
            .map(|link| LinkView {
                status: link.status_at(now),
                link,
            })
            .collect();

        Ok(Page::new(items, total, page, page_size))
    }
}
