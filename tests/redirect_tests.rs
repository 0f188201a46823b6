//! RedirectService tests
//!
//! Lookup → expiry → dedup ordering, counting and best-effort writes.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Duration, TimeZone, Utc};
use linkpulse::analytics::{DedupCache, NoopDeviceParser, WootheeDeviceParser};
use linkpulse::services::{
    AnalyticsService, CreateLinkRequest, LinkService, RedirectOutcome, RedirectService,
    UpdateLinkRequest,
};
use linkpulse::storage::{LinkStore, Link};

use common::{InstrumentedStore, ScriptedGenerator, settings};

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

struct Harness {
    store: Arc<InstrumentedStore>,
    links: LinkService,
    redirect: RedirectService,
    analytics: AnalyticsService,
}

fn harness(codes: &[&str]) -> Harness {
    let store = InstrumentedStore::new();
    let links = LinkService::new(
        store.clone(),
        store.clone(),
        Arc::new(ScriptedGenerator::new(codes)),
        settings(),
    );
    let redirect = RedirectService::new(
        store.clone(),
        store.clone(),
        Arc::new(DedupCache::new(1000)),
        Arc::new(WootheeDeviceParser),
        settings(),
    );
    let analytics = AnalyticsService::new(store.clone(), store.clone());
    Harness {
        store,
        links,
        redirect,
        analytics,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

async fn create(h: &Harness, expire: Option<&str>) -> Link {
    h.links
        .create(
            "alice",
            CreateLinkRequest {
                original_link: "https://example.com/target".to_string(),
                remark: "campaign".to_string(),
                expire: expire.map(str::to_string),
            },
        )
        .await
        .unwrap()
}

async fn count_of(h: &Harness, link: &Link) -> i64 {
    h.store
        .find_owned("alice", link.id)
        .await
        .unwrap()
        .unwrap()
        .count
}

#[tokio::test]
async fn test_unknown_and_malformed_codes_are_not_found() {
    let h = harness(&["abcdef12"]);
    create(&h, None).await;

    for code in ["00000000", "ABCDEF12", "abc", "abcdef12/x", "../admin"] {
        let outcome = h
            .redirect
            .resolve(code, Some("1.2.3.4"), None, t0())
            .await
            .unwrap();
        assert_eq!(outcome, RedirectOutcome::NotFound, "code {}", code);
    }
    assert_eq!(h.store.inner.event_count(), 0);
}

#[tokio::test]
async fn test_counted_visit_records_event() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), Some(CHROME_UA), t0())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RedirectOutcome::Redirect {
            target: "https://example.com/target".to_string()
        }
    );
    assert_eq!(count_of(&h, &link).await, 1);

    let visits = h
        .analytics
        .list_visits("alice", link.id, 1, 10)
        .await
        .unwrap();
    assert_eq!(visits.total_count, 1);
    let event = &visits.items[0];
    assert_eq!(event.link_id, link.id);
    assert_eq!(event.owner_id, "alice");
    assert_eq!(event.ip_address.as_deref(), Some("1.2.3.4"));
    assert_eq!(event.user_agent.as_deref(), Some(CHROME_UA));
    assert_eq!(event.browser_name.as_deref(), Some("Chrome"));
    assert_eq!(event.time, t0());
}

#[tokio::test]
async fn test_expired_link_is_gone_and_not_counted() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, Some("2026-10-16T11:00:00Z")).await;

    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), Some(CHROME_UA), t0())
        .await
        .unwrap();
    assert_eq!(outcome, RedirectOutcome::Expired);
    assert_eq!(count_of(&h, &link).await, 0);
    assert_eq!(h.store.inner.event_count(), 0);
    // 过期访问不占用去重窗口
    assert!(h.redirect.dedup().is_empty());
}

#[tokio::test]
async fn test_expiry_wins_over_existing_count_and_dedup_entry() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    let first = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0())
        .await
        .unwrap();
    assert!(matches!(first, RedirectOutcome::Redirect { .. }));
    assert_eq!(count_of(&h, &link).await, 1);
    assert_eq!(h.redirect.dedup().len(), 1);

    h.links
        .update(
            "alice",
            link.id,
            UpdateLinkRequest {
                expire: Some("2026-10-16T11:00:00Z".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let writes = h.store.writes();

    // 仍在去重窗口内，但过期优先
    let second = h
        .redirect
        .resolve(
            "abcdef12",
            Some("1.2.3.4"),
            None,
            t0() + Duration::seconds(2),
        )
        .await
        .unwrap();

    assert_eq!(second, RedirectOutcome::Expired);
    assert_eq!(h.store.writes(), writes);
    assert_eq!(count_of(&h, &link).await, 1);
    assert_eq!(h.store.inner.event_count(), 1);
}

#[tokio::test]
async fn test_expire_equal_to_now_is_still_active() {
    let h = harness(&["abcdef12"]);
    create(&h, Some("2026-10-16T12:00:00Z")).await;

    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0())
        .await
        .unwrap();
    assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
}

#[tokio::test]
async fn test_double_hit_within_window_counts_once() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    let first = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), Some(CHROME_UA), t0())
        .await
        .unwrap();
    let writes = h.store.writes();
    let second = h
        .redirect
        .resolve(
            "abcdef12",
            Some("1.2.3.4"),
            Some(CHROME_UA),
            t0() + Duration::seconds(3),
        )
        .await
        .unwrap();

    assert!(matches!(first, RedirectOutcome::Redirect { .. }));
    assert_eq!(
        second,
        RedirectOutcome::RedirectOnly {
            target: "https://example.com/target".to_string()
        }
    );
    assert_eq!(h.store.writes(), writes);
    assert_eq!(count_of(&h, &link).await, 1);
    assert_eq!(h.store.inner.event_count(), 1);
}

#[tokio::test]
async fn test_hit_after_window_counts_again() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    h.redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0())
        .await
        .unwrap();
    // 窗口为 7 秒，刚好 7 秒后不再抑制
    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0() + Duration::seconds(7))
        .await
        .unwrap();

    assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
    assert_eq!(count_of(&h, &link).await, 2);
}

#[tokio::test]
async fn test_suppressed_hit_does_not_extend_window() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    for offset in [0, 5, 10] {
        h.redirect
            .resolve(
                "abcdef12",
                Some("1.2.3.4"),
                None,
                t0() + Duration::seconds(offset),
            )
            .await
            .unwrap();
    }
    // t=5 被抑制且不刷新时间戳，所以 t=10 重新计数
    assert_eq!(count_of(&h, &link).await, 2);
}

#[tokio::test]
async fn test_dedup_is_per_ip_and_per_code() {
    let h = harness(&["abcdef12", "12abcdef"]);
    let first = create(&h, None).await;
    let second = create(&h, None).await;

    let now = t0();
    for (code, ip) in [
        ("abcdef12", "1.2.3.4"),
        ("abcdef12", "5.6.7.8"),
        ("12abcdef", "1.2.3.4"),
    ] {
        let outcome = h
            .redirect
            .resolve(code, Some(ip), None, now)
            .await
            .unwrap();
        assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
    }

    assert_eq!(count_of(&h, &first).await, 2);
    assert_eq!(count_of(&h, &second).await, 1);
}

#[tokio::test]
async fn test_missing_ip_shares_one_dedup_key() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    h.redirect.resolve("abcdef12", None, None, t0()).await.unwrap();
    let outcome = h
        .redirect
        .resolve("abcdef12", None, None, t0() + Duration::seconds(1))
        .await
        .unwrap();

    assert!(matches!(outcome, RedirectOutcome::RedirectOnly { .. }));
    assert_eq!(count_of(&h, &link).await, 1);
}

#[tokio::test]
async fn test_counter_failure_still_redirects() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;
    h.store.fail_increment.store(true, Ordering::SeqCst);

    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0())
        .await
        .unwrap();

    assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
    assert_eq!(count_of(&h, &link).await, 0);
    // 事件仍然写入
    assert_eq!(h.store.inner.event_count(), 1);
}

#[tokio::test]
async fn test_event_failure_still_redirects() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;
    h.store.fail_append.store(true, Ordering::SeqCst);

    let outcome = h
        .redirect
        .resolve("abcdef12", Some("1.2.3.4"), None, t0())
        .await
        .unwrap();

    assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
    assert_eq!(count_of(&h, &link).await, 1);
    assert_eq!(h.store.inner.event_count(), 0);
}

#[tokio::test]
async fn test_counter_is_monotonic_under_concurrency() {
    let store = InstrumentedStore::new();
    let links = LinkService::new(
        store.clone(),
        store.clone(),
        Arc::new(ScriptedGenerator::new(&["abcdef12"])),
        settings(),
    );
    let redirect = Arc::new(RedirectService::new(
        store.clone(),
        store.clone(),
        Arc::new(DedupCache::new(1000)),
        Arc::new(NoopDeviceParser),
        settings(),
    ));
    let link = links
        .create(
            "alice",
            CreateLinkRequest {
                original_link: "https://example.com".to_string(),
                remark: "hot".to_string(),
                expire: None,
            },
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..50 {
        let redirect = redirect.clone();
        handles.push(tokio::spawn(async move {
            let ip = format!("10.0.0.{}", i);
            redirect
                .resolve("abcdef12", Some(&ip), None, Utc::now())
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            RedirectOutcome::Redirect { .. }
        ));
    }

    let stored = store.find_owned("alice", link.id).await.unwrap().unwrap();
    assert_eq!(stored.count, 50);
    assert_eq!(store.inner.event_count(), 50);
}

#[tokio::test]
async fn test_visits_of_other_owner_are_not_found() {
    let h = harness(&["abcdef12"]);
    let link = create(&h, None).await;

    let err = h
        .analytics
        .list_visits("mallory", link.id, 1, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, linkpulse::errors::LinkpulseError::NotFound(_)));
}
