//! Shared test doubles for the integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use linkpulse::config::LinkSettings;
use linkpulse::errors::{LinkpulseError, Result};
use linkpulse::services::CodeGenerator;
use linkpulse::storage::{
    AnalyticsStore, Link, LinkFilter, LinkPatch, LinkStore, MemoryStorage, NewLink,
    NewVisitEvent, VisitEvent,
};

pub fn settings() -> LinkSettings {
    LinkSettings {
        base_url: "http://lp.test".to_string(),
        dedup_window_seconds: 7,
        code_length: 8,
        max_generation_attempts: 10,
    }
}

/// Returns queued codes first, then repeats the last one
pub struct ScriptedGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    pub calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().map(|c| c.to_string()).unwrap_or_default()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CodeGenerator for ScriptedGenerator {
    fn generate(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.codes.lock().unwrap().pop_front();
        match next {
            Some(code) => {
                *self.last.lock().unwrap() = code.clone();
                code
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}

/// MemoryStorage wrapper that counts writes and can inject failures
#[derive(Default)]
pub struct InstrumentedStore {
    pub inner: MemoryStorage,
    pub writes: AtomicUsize,
    pub inserts: AtomicUsize,
    /// 下一次 insert 前先被“并发者”抢走的 short_link 数
    pub steal_next_inserts: AtomicUsize,
    pub fail_increment: AtomicBool,
    pub fail_append: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkStore for InstrumentedStore {
    async fn find_by_short_link(&self, short_link: &str) -> Result<Option<Link>> {
        self.inner.find_by_short_link(short_link).await
    }

    async fn find_owned(&self, owner_id: &str, id: i64) -> Result<Option<Link>> {
        self.inner.find_owned(owner_id, id).await
    }

    async fn insert(&self, link: NewLink) -> Result<Link> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let steal = self
            .steal_next_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if steal {
            // 模拟另一个请求在检查与插入之间占用了同一个短码
            let mut rival = link.clone();
            rival.owner_id = "rival".to_string();
            self.inner.insert(rival).await?;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(link).await
    }

    async fn update(&self, owner_id: &str, id: i64, patch: &LinkPatch) -> Result<Option<Link>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(owner_id, id, patch).await
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(owner_id, id).await
    }

    async fn increment_count(&self, id: i64) -> Result<()> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(LinkpulseError::store("counter unavailable"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.increment_count(id).await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
    ) -> Result<(Vec<Link>, u64)> {
        self.inner.list_by_owner(owner_id, filter).await
    }
}

#[async_trait]
impl AnalyticsStore for InstrumentedStore {
    async fn append(&self, event: NewVisitEvent) -> Result<VisitEvent> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(LinkpulseError::store("event log unavailable"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.append(event).await
    }

    async fn delete_by_link(&self, link_id: i64) -> Result<u64> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_link(link_id).await
    }

    async fn list_by_link(
        &self,
        link_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<VisitEvent>, u64)> {
        self.inner.list_by_link(link_id, page, page_size).await
    }
}
