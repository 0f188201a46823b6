//! Link and visit-event persistence
//!
//! Two abstract stores sit behind this module:
//! - [`LinkStore`]: short link → link record, with a unique `short_link`
//! - [`AnalyticsStore`]: append-only visit event log
//!
//! [`SeaOrmStorage`] (SQLite / PostgreSQL) and [`MemoryStorage`] implement both.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStorage;
pub use models::{
    Link, LinkFilter, LinkPatch, LinkStatus, NewLink, NewVisitEvent, VisitEvent, page_offset,
};

/// 进程内存储的 database_url
pub const MEMORY_DATABASE_URL: &str = "memory";

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// 按完整短链查找（重定向热路径）
    async fn find_by_short_link(&self, short_link: &str) -> Result<Option<Link>>;

    /// 按 id 查找，仅返回属于 `owner_id` 的链接
    async fn find_owned(&self, owner_id: &str, id: i64) -> Result<Option<Link>>;

    /// 插入新链接，`short_link` 重复时返回 `Conflict`
    async fn insert(&self, link: NewLink) -> Result<Link>;

    /// 部分更新，链接不存在（或不属于该 owner）时返回 `None`
    async fn update(&self, owner_id: &str, id: i64, patch: &LinkPatch) -> Result<Option<Link>>;

    /// 删除链接，返回是否确实删除了记录
    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool>;

    /// 原子地 `count = count + 1`
    async fn increment_count(&self, id: i64) -> Result<()>;

    /// 按创建时间倒序分页，返回 (当前页, 总数)
    async fn list_by_owner(&self, owner_id: &str, filter: &LinkFilter)
    -> Result<(Vec<Link>, u64)>;

    /// 存储可达性检查
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn append(&self, event: NewVisitEvent) -> Result<VisitEvent>;

    /// 删除某链接的全部访问事件，返回删除条数
    async fn delete_by_link(&self, link_id: i64) -> Result<u64>;

    /// 按时间倒序分页，返回 (当前页, 总数)
    async fn list_by_link(
        &self,
        link_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<VisitEvent>, u64)>;
}

/// 同一后端的两个视图
#[derive(Clone)]
pub struct Stores {
    pub links: Arc<dyn LinkStore>,
    pub analytics: Arc<dyn AnalyticsStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        Self {
            links: storage.clone(),
            analytics: storage,
        }
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Stores> {
        let database_url = config.database_url.trim();

        if database_url == MEMORY_DATABASE_URL {
            tracing::warn!("Using in-memory storage, data will be lost on restart");
            return Ok(Stores::memory());
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = Arc::new(SeaOrmStorage::new(database_url, &backend_type, config).await?);
        Ok(Stores {
            links: storage.clone(),
            analytics: storage,
        })
    }
}
