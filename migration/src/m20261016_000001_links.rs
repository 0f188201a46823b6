use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 links 表
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::OwnerId).string_len(64).not_null())
                    .col(ColumnDef::new(Links::OriginalLink).text().not_null())
                    .col(ColumnDef::new(Links::ShortLink).string_len(512).not_null())
                    .col(ColumnDef::new(Links::Remark).string().not_null())
                    .col(
                        ColumnDef::new(Links::Expire)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Links::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Links::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // short_link 全局唯一，并发创建时由数据库兜底
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_links_short_link")
                    .table(Links::Table)
                    .col(Links::ShortLink)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按 owner 分页列表
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_created")
                    .table(Links::Table)
                    .col(Links::OwnerId)
                    .col(Links::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_owner_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("uq_links_short_link").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Links {
    Table,
    Id,
    OwnerId,
    OriginalLink,
    ShortLink,
    Remark,
    Expire,
    Count,
    CreatedAt,
    UpdatedAt,
}
