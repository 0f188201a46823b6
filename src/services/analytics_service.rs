//! Analytics service layer
//!
//! Owner-scoped access to the visit event log.

use std::sync::Arc;

use tracing::debug;

use super::pagination::{Page, normalize_page};
use crate::errors::{LinkpulseError, Result};
use crate::storage::{AnalyticsStore, LinkStore, VisitEvent};

pub type VisitPage = Page<VisitEvent>;

pub struct AnalyticsService {
    links: Arc<dyn LinkStore>,
    analytics: Arc<dyn AnalyticsStore>,
}

impl AnalyticsService {
    pub fn new(links: Arc<dyn LinkStore>, analytics: Arc<dyn AnalyticsStore>) -> Self {
        Self { links, analytics }
    }

    /// Visits of an owned link, newest first
    pub async fn list_visits(
        &self,
        owner_id: &str,
        link_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<VisitPage> {
        if self.links.find_owned(owner_id, link_id).await?.is_none() {
            return Err(LinkpulseError::not_found(format!(
                "link {} not found",
                link_id
            )));
        }

        let (page, page_size) = normalize_page(page, page_size);
        let (events, total) = self
            .analytics
            .list_by_link(link_id, page, page_size)
            .await?;
        debug!(
            "AnalyticsService: link {} page {} -> {}/{} events",
            link_id,
            page,
            events.len(),
            total
        );

        Ok(Page::new(events, total, page, page_size))
    }
}
