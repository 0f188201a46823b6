//! 访问事件表迁移
//!
//! 每次被计数的访问写入一行：IP、原始 UA、解析后的设备信息、访问时间。
//! 只追加，删除只随 links 级联发生（外键 ON DELETE CASCADE）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VisitEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VisitEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VisitEvents::LinkId).big_integer().not_null())
                    .col(
                        ColumnDef::new(VisitEvents::OwnerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VisitEvents::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .col(ColumnDef::new(VisitEvents::UserAgent).text().null())
                    .col(
                        ColumnDef::new(VisitEvents::DeviceType)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(VisitEvents::OsName).string_len(64).null())
                    .col(
                        ColumnDef::new(VisitEvents::BrowserName)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(VisitEvents::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // 链接删除后才到达的事件会被外键拒绝，不会留下孤儿行
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_visit_events_link_id")
                            .from(VisitEvents::Table, VisitEvents::LinkId)
                            .to(Links::Table, Links::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 复合索引（单链接按时间倒序分页）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_visit_events_link_time")
                    .table(VisitEvents::Table)
                    .col(VisitEvents::LinkId)
                    .col(VisitEvents::Time)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_visit_events_link_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(VisitEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Links {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum VisitEvents {
    Table,
    Id,
    LinkId,
    OwnerId,
    IpAddress,
    UserAgent,
    DeviceType,
    OsName,
    BrowserName,
    Time,
}
