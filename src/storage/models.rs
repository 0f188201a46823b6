use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub owner_id: String,
    pub original_link: String,
    pub short_link: String,
    pub remark: String,
    pub expire: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// `expire` 已设置且严格早于 `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire.is_some_and(|expire| expire < now)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.is_expired_at(now) {
            LinkStatus::Inactive
        } else {
            LinkStatus::Active
        }
    }
}

/// 待插入的新链接（id 和计数由存储分配）
#[derive(Debug, Clone)]
pub struct NewLink {
    pub owner_id: String,
    pub original_link: String,
    pub short_link: String,
    pub remark: String,
    pub expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 部分更新；`None` 表示保持不变
///
/// `expire: Some(None)` clears the expiry.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub original_link: Option<String>,
    pub remark: Option<String>,
    pub expire: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.original_link.is_none() && self.remark.is_none() && self.expire.is_none()
    }

    pub(crate) fn apply(&self, link: &mut Link, now: DateTime<Utc>) {
        if let Some(ref original_link) = self.original_link {
            link.original_link = original_link.clone();
        }
        if let Some(ref remark) = self.remark {
            link.remark = remark.clone();
        }
        if let Some(expire) = self.expire {
            link.expire = expire;
        }
        link.updated_at = now;
    }
}

/// 链接列表过滤条件
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// remark 模糊搜索（不区分大小写）
    pub search: Option<String>,
    /// 从 1 开始
    pub page: u64,
    pub page_size: u64,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            page_size: 10,
        }
    }
}

impl LinkFilter {
    /// 搜索词是否作为字面子串命中 remark
    ///
    /// Case folding is ASCII-only, the same as SQLite's `lower()`; the SQL
    /// backend escapes `%` and `_` so both backends match literally.
    pub fn matches(&self, remark: &str) -> bool {
        match self.search.as_deref() {
            Some(term) if !term.is_empty() => remark
                .to_ascii_lowercase()
                .contains(&term.to_ascii_lowercase()),
            _ => true,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        page_offset(self.page, self.page_size)
    }
}

/// 第 `page` 页（从 1 开始）的行偏移
///
/// `None` when the offset does not fit a SQL `OFFSET` (i64); such a page is
/// past the end of any table and reads as empty.
pub fn page_offset(page: u64, page_size: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(page_size)
        .filter(|offset| *offset <= i64::MAX as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Inactive,
}

/// 访问事件（每次未被去重的访问写入一条）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub id: i64,
    pub link_id: i64,
    pub owner_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: Option<String>,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVisitEvent {
    pub link_id: i64,
    pub owner_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_type: Option<String>,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
    pub time: DateTime<Utc>,
}
