//! LinkStore implementation for SeaOrmStorage

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::converters::{link_model_to_link, new_link_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkpulseError, Result};
use crate::storage::{Link, LinkFilter, LinkPatch, LinkStore, NewLink};

use migration::entities::link;

const LIKE_ESCAPE: char = '\\';

/// 转义 LIKE 通配符，使 `%` `_` 按字面匹配
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

impl SeaOrmStorage {
    async fn find_owned_model(&self, owner_id: &str, id: i64) -> Result<Option<link::Model>> {
        let db = &self.db;
        let model = retry::with_retry("find_owned", self.retry_config, || async {
            link::Entity::find_by_id(id)
                .filter(link::Column::OwnerId.eq(owner_id))
                .one(db)
                .await
        })
        .await?;
        Ok(model)
    }

    fn owner_condition(owner_id: &str, filter: &LinkFilter) -> Condition {
        let mut condition = Condition::all().add(link::Column::OwnerId.eq(owner_id));

        // remark 模糊搜索，不区分大小写；搜索词按字面匹配
        if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&term.to_ascii_lowercase()));
            condition = condition.add(
                Expr::expr(Func::lower(Expr::col(link::Column::Remark)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        condition
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn find_by_short_link(&self, short_link: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let model = retry::with_retry("find_by_short_link", self.retry_config, || async {
            link::Entity::find()
                .filter(link::Column::ShortLink.eq(short_link))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(link_model_to_link))
    }

    async fn find_owned(&self, owner_id: &str, id: i64) -> Result<Option<Link>> {
        Ok(self
            .find_owned_model(owner_id, id)
            .await?
            .map(link_model_to_link))
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link> {
        let db = &self.db;
        let short_link = new_link.short_link.clone();

        // 唯一约束冲突不可重试，经 From<DbErr> 映射为 Conflict
        let model = retry::with_retry("insert_link", self.retry_config, || {
            let active = new_link_to_active_model(new_link.clone());
            async move { active.insert(db).await }
        })
        .await
        .map_err(LinkpulseError::from)?;

        info!("Short link created: {}", short_link);
        Ok(link_model_to_link(model))
    }

    async fn update(&self, owner_id: &str, id: i64, patch: &LinkPatch) -> Result<Option<Link>> {
        let Some(model) = self.find_owned_model(owner_id, id).await? else {
            return Ok(None);
        };

        let mut active: link::ActiveModel = model.into();
        if let Some(ref original_link) = patch.original_link {
            active.original_link = Set(original_link.clone());
        }
        if let Some(ref remark) = patch.remark {
            active.remark = Set(remark.clone());
        }
        if let Some(expire) = patch.expire {
            active.expire = Set(expire);
        }
        active.updated_at = Set(Utc::now());

        let db = &self.db;
        let updated = retry::with_retry("update_link", self.retry_config, || {
            let active = active.clone();
            async move { active.update(db).await }
        })
        .await?;

        Ok(Some(link_model_to_link(updated)))
    }

    async fn delete(&self, owner_id: &str, id: i64) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry("delete_link", self.retry_config, || async {
            link::Entity::delete_many()
                .filter(link::Column::Id.eq(id))
                .filter(link::Column::OwnerId.eq(owner_id))
                .exec(db)
                .await
        })
        .await?;

        Ok(result.rows_affected > 0)
    }

    async fn increment_count(&self, id: i64) -> Result<()> {
        let db = &self.db;
        // UPDATE links SET count = count + 1 WHERE id = ?
        let result = retry::with_retry("increment_count", self.retry_config, || async {
            link::Entity::update_many()
                .col_expr(link::Column::Count, Expr::col(link::Column::Count).add(1))
                .filter(link::Column::Id.eq(id))
                .exec(db)
                .await
        })
        .await?;

        if result.rows_affected == 0 {
            debug!("increment_count: link {} no longer exists", id);
        }
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &LinkFilter,
    ) -> Result<(Vec<Link>, u64)> {
        let db = &self.db;
        let condition = Self::owner_condition(owner_id, filter);

        let total = retry::with_retry("list_by_owner(count)", self.retry_config, || async {
            link::Entity::find()
                .filter(condition.clone())
                .count(db)
                .await
        })
        .await?;

        let page_size = Ord::max(filter.page_size, 1);
        let Some(offset) = filter.offset() else {
            debug!("Page {} is beyond any offset, returning empty", filter.page);
            return Ok((Vec::new(), total));
        };
        let models = retry::with_retry("list_by_owner(data)", self.retry_config, || async {
            link::Entity::find()
                .filter(condition.clone())
                .order_by_desc(link::Column::CreatedAt)
                .order_by_desc(link::Column::Id)
                .offset(offset)
                .limit(page_size)
                .all(db)
                .await
        })
        .await?;

        Ok((models.into_iter().map(link_model_to_link).collect(), total))
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}
