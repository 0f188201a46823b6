//! AnalyticsStore implementation for SeaOrmStorage

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use super::converters::{new_event_to_active_model, visit_model_to_event};
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::{AnalyticsStore, NewVisitEvent, VisitEvent, page_offset};

use migration::entities::visit_event;

#[async_trait]
impl AnalyticsStore for SeaOrmStorage {
    async fn append(&self, event: NewVisitEvent) -> Result<VisitEvent> {
        let db = &self.db;
        let model = retry::with_retry("append_visit", self.retry_config, || {
            let active = new_event_to_active_model(event.clone());
            async move { active.insert(db).await }
        })
        .await?;

        Ok(visit_model_to_event(model))
    }

    async fn delete_by_link(&self, link_id: i64) -> Result<u64> {
        let db = &self.db;
        let result = retry::with_retry("delete_visits", self.retry_config, || async {
            visit_event::Entity::delete_many()
                .filter(visit_event::Column::LinkId.eq(link_id))
                .exec(db)
                .await
        })
        .await?;

        debug!(
            "Deleted {} visit events of link {}",
            result.rows_affected, link_id
        );
        Ok(result.rows_affected)
    }

    async fn list_by_link(
        &self,
        link_id: i64,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<VisitEvent>, u64)> {
        let db = &self.db;

        let total = retry::with_retry("list_visits(count)", self.retry_config, || async {
            visit_event::Entity::find()
                .filter(visit_event::Column::LinkId.eq(link_id))
                .count(db)
                .await
        })
        .await?;

        let page_size = page_size.max(1);
        let Some(offset) = page_offset(page, page_size) else {
            return Ok((Vec::new(), total));
        };
        let models = retry::with_retry("list_visits(data)", self.retry_config, || async {
            visit_event::Entity::find()
                .filter(visit_event::Column::LinkId.eq(link_id))
                .order_by_desc(visit_event::Column::Time)
                .order_by_desc(visit_event::Column::Id)
                .offset(offset)
                .limit(page_size)
                .all(db)
                .await
        })
        .await?;

        Ok((models.into_iter().map(visit_model_to_event).collect(), total))
    }
}
