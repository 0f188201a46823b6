//! Duplicate-hit suppression cache
//!
//! Remembers when each `(client_ip, code)` pair last produced a counted
//! visit. Single process, best effort: entries are lost on restart and
//! concurrent writes to the same key are last-write-wins.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub client_ip: String,
    pub code: String,
}

impl DedupKey {
    pub fn new(client_ip: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            code: code.into(),
        }
    }
}

pub struct DedupCache {
    entries: DashMap<DedupKey, DateTime<Utc>>,
    max_entries: usize,
}

impl DedupCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// 窗口内已有一次计数访问则返回 true（只读，不刷新时间戳）
    pub fn should_suppress(&self, key: &DedupKey, now: DateTime<Utc>, window: Duration) -> bool {
        self.entries
            .get(key)
            .is_some_and(|last| now.signed_duration_since(*last) < window)
    }

    /// 记录一次被计数的访问
    pub fn touch(&self, key: DedupKey, now: DateTime<Utc>) {
        self.entries.insert(key, now);

        if self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
    }

    /// 清除已超出窗口的条目，返回清除数量
    pub fn sweep(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, last| now.signed_duration_since(*last) < window);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 超出容量时淘汰最旧的条目，一次收缩到容量的 90%
    fn evict_oldest(&self) {
        let target = self.max_entries - self.max_entries / 10;
        let mut snapshot: Vec<(DedupKey, DateTime<Utc>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        if snapshot.len() <= target {
            return;
        }

        snapshot.sort_unstable_by_key(|(_, last)| *last);
        let excess = snapshot.len() - target;
        for (key, last) in snapshot.into_iter().take(excess) {
            // 期间被刷新过的条目保留
            self.entries.remove_if(&key, |_, current| *current == last);
        }
        debug!("DedupCache: evicted {} oldest entries", excess);
    }

    /// 启动后台清理任务
    ///
    /// Must be called from within a tokio runtime. The task runs until the
    /// returned handle is aborted.
    pub fn start_sweeper(self: &Arc<Self>, every: StdDuration, window: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(every.max(StdDuration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.sweep(Utc::now(), window);
                if removed > 0 {
                    trace!(
                        "DedupCache: swept {} stale entries, {} remaining",
                        removed,
                        cache.len()
                    );
                }
            }
        })
    }
}
