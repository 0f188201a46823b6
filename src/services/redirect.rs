//! Redirect resolution
//!
//! Every visit walks LOOKUP → EXPIRY → DEDUP, then either records the
//! visit (counter + visit event) or redirects silently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace, warn};

use crate::analytics::{DedupCache, DedupKey, DeviceParser};
use crate::config::LinkSettings;
use crate::errors::Result;
use crate::storage::{AnalyticsStore, Link, LinkStore, NewVisitEvent};

/// 无法获取客户端 IP 时的去重键
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// 已计数的访问
    Redirect { target: String },
    /// 去重窗口内的重复访问，不写任何数据
    RedirectOnly { target: String },
    NotFound,
    Expired,
}

impl RedirectOutcome {
    pub fn target(&self) -> Option<&str> {
        match self {
            RedirectOutcome::Redirect { target } | RedirectOutcome::RedirectOnly { target } => {
                Some(target)
            }
            RedirectOutcome::NotFound | RedirectOutcome::Expired => None,
        }
    }
}

pub struct RedirectService {
    links: Arc<dyn LinkStore>,
    analytics: Arc<dyn AnalyticsStore>,
    dedup: Arc<DedupCache>,
    device_parser: Arc<dyn DeviceParser>,
    settings: LinkSettings,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkStore>,
        analytics: Arc<dyn AnalyticsStore>,
        dedup: Arc<DedupCache>,
        device_parser: Arc<dyn DeviceParser>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            links,
            analytics,
            dedup,
            device_parser,
            settings,
        }
    }

    pub fn dedup(&self) -> &Arc<DedupCache> {
        &self.dedup
    }

    /// Resolve a short code for one visit
    ///
    /// Only a failed lookup is an error. Counter and visit-event write
    /// failures are logged and the visitor is still redirected.
    #[instrument(skip(self, client_ip, user_agent, now), fields(code = %code))]
    pub async fn resolve(
        &self,
        code: &str,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RedirectOutcome> {
        // 格式不合法的短码不可能存在，直接 404
        if !self.settings.is_valid_code(code) {
            trace!("Malformed short code");
            return Ok(RedirectOutcome::NotFound);
        }

        let short_link = self.settings.short_link_for(code);
        let Some(link) = self.links.find_by_short_link(&short_link).await? else {
            debug!("Short link not found");
            return Ok(RedirectOutcome::NotFound);
        };

        if link.is_expired_at(now) {
            debug!("Short link expired at {:?}", link.expire);
            return Ok(RedirectOutcome::Expired);
        }

        let key = DedupKey::new(client_ip.unwrap_or(UNKNOWN_CLIENT), code);
        if self
            .dedup
            .should_suppress(&key, now, self.settings.dedup_window())
        {
            debug!("Duplicate hit from {} suppressed", key.client_ip);
            return Ok(RedirectOutcome::RedirectOnly {
                target: link.original_link,
            });
        }

        self.dedup.touch(key, now);
        self.record_visit(&link, client_ip, user_agent, now).await;

        Ok(RedirectOutcome::Redirect {
            target: link.original_link,
        })
    }

    async fn record_visit(
        &self,
        link: &Link,
        client_ip: Option<&str>,
        user_agent: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self.links.increment_count(link.id).await {
            warn!("Failed to increment visit count of link {}: {}", link.id, e);
        }

        let user_agent = user_agent.map(str::trim).filter(|ua| !ua.is_empty());
        let device = user_agent
            .map(|ua| self.device_parser.parse(ua))
            .unwrap_or_default();

        let event = NewVisitEvent {
            link_id: link.id,
            owner_id: link.owner_id.clone(),
            ip_address: client_ip.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            device_type: device.device_type,
            os_name: device.os_name,
            browser_name: device.browser_name,
            time: now,
        };

        if let Err(e) = self.analytics.append(event).await {
            warn!("Failed to record visit event of link {}: {}", link.id, e);
        }
    }
}
