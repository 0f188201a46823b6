//! In-process storage backed by `DashMap`
//!
//! Used for tests and `database_url = "memory"` runs. Nothing survives a
//! restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{
    AnalyticsStore, Link, LinkFilter, LinkPatch, LinkStore, NewLink, NewVisitEvent, VisitEvent,
    page_offset,
};
use crate::errors::{LinkpulseError, Result};

#[derive(Default)]
pub struct MemoryStorage {
    links: DashMap<i64, Link>,
    /// short_link -> id，唯一约束
    short_links: DashMap<String, i64>,
    events: DashMap<i64, VisitEvent>,
    next_link_id: AtomicI64,
    next_event_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

fn paginate<T>(items: Vec<T>, page: u64, page_size: u64) -> Vec<T> {
    let Some(offset) = page_offset(page, page_size) else {
        return Vec::new();
    };
    items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(page_size).unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl LinkStore for MemoryStorage {
    async fn find_by_short_link(&self, short_link: &str) -> Result<Option<Link>> {
        let Some(id) = self.short_links.get(short_link).map(|r| *r) else {
            return Ok(None);
        };
        Ok(self.links.get(&id).map(|r| r.clone()))
    }

    async fn find_owned(&self, owner_id: &str, id: i64) -> Result<Option<Link>> {
        Ok(self
            .links
            .get(&id)
            .filter(|link| link.owner_id == owner_id)
            .map(|link| link.clone()))
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link> {
        // 先占住 short_link，保证并发插入时只有一个成功
        let id = match self.short_links.entry(new_link.short_link.clone()) {
            Entry::Occupied(_) => {
                return Err(LinkpulseError::conflict(format!(
                    "short link already exists: {}",
                    new_link.short_link
                )));
            }
            Entry::Vacant(slot) => {
                let id = self.next_link_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(id);
                id
            }
        };

        let link = Link {
            id,
            owner_id: new_link.owner_id,
            original_link: new_link.original_link,
            short_link: new_link.short_link,
            remark: new_link.remark,
            expire: new_link.expire,
            count: 0,
            created_at: new_link.created_at,
            updated_at: new_link.created_at,
        };
        self.links.insert(id, link.clone());
        Ok(link)
    }

    async fn update(&self, owner_id: &str, id: i64, patch: &LinkPatch) -> Result<Option<Link>> {
        match self.links.get_mut(&id) {
            Some(mut link) if link.owner_id == owner_id => {
                patch.apply(&mut link, Utc::now());
                Ok(Some(link.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool> {
        match self.links.remove_if(&id, |_, link| link.owner_id == owner_id) {
            Some((_, link)) => {
                self.short_links.remove(&link.short_link);
                // 与 SQL 外键一致：级联删除访问事件
                self.events.retain(|_, event| event.link_id != id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_count(&self, id: i64) -> Result<()> {
        // 在分片锁内原地自增
        if let Some(mut link) = self.links.get_mut(&id) {
            link.count += 1;
        }
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
    ) -> Result<(Vec<Link>, u64)> {
        let mut matched: Vec<Link> = self
            .links
            .iter()
            .filter(|link| link.owner_id == owner_id && filter.matches(&link.remark))
            .map(|link| link.clone())
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matched.len() as u64;
        Ok((paginate(matched, filter.page, filter.page_size), total))
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStorage {
    async fn append(&self, event: NewVisitEvent) -> Result<VisitEvent> {
        // 持有链接的读锁直到事件写入完成，delete 的级联清理会排在其后
        let Some(_link) = self.links.get(&event.link_id) else {
            return Err(LinkpulseError::store(format!(
                "visit event references missing link {}",
                event.link_id
            )));
        };

        let id = self.next_event_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = VisitEvent {
            id,
            link_id: event.link_id,
            owner_id: event.owner_id,
            ip_address: event.ip_address,
            user_agent: event.user_agent,
            device_type: event.device_type,
            os_name: event.os_name,
            browser_name: event.browser_name,
            time: event.time,
        };
        self.events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_link(&self, link_id: i64) -> Result<u64> {
        let before = self.events.len();
        self.events.retain(|_, event| event.link_id != link_id);
        Ok(before.saturating_sub(self.events.len()) as u64)
    }

    async fn list_by_link(
        &self,
        link_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<VisitEvent>, u64)> {
        let mut matched: Vec<VisitEvent> = self
            .events
            .iter()
            .filter(|event| event.link_id == link_id)
            .map(|event| event.clone())
            .collect();
        matched.sort_by(|a, b| b.time.cmp(&a.time).then(b.id.cmp(&a.id)));

        let total = matched.len() as u64;
        Ok((paginate(matched, page, page_size), total))
    }
}
