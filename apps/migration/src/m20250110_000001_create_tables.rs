use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
        .col(
            ColumnDef::new(Users::SubjectId)
                .text()
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(Users::Name).text().not_null())
        .col(ColumnDef::new(Users::ProfileImageUrl).text())
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

fn posts_table() -> TableCreateStatement {
    Table::create()
        .table(Posts::Table)
        .if_not_exists()
        .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Posts::UserId).uuid().not_null())
        .col(ColumnDef::new(Posts::ImageUrl).text().not_null())
        .col(ColumnDef::new(Posts::Caption).text())
        .col(
            ColumnDef::new(Posts::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Posts::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_posts_user")
                .from(Posts::Table, Posts::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn likes_table() -> TableCreateStatement {
    Table::create()
        .table(Likes::Table)
        .if_not_exists()
        .col(ColumnDef::new(Likes::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Likes::PostId).uuid().not_null())
        .col(ColumnDef::new(Likes::UserId).uuid().not_null())
        .col(
            ColumnDef::new(Likes::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_likes_post")
                .from(Likes::Table, Likes::PostId)
                .to(Posts::Table, Posts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_likes_user")
                .from(Likes::Table, Likes::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn comments_table() -> TableCreateStatement {
    Table::create()
        .table(Comments::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Comments::Id)
                .uuid()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Comments::PostId).uuid().not_null())
        .col(ColumnDef::new(Comments::UserId).uuid().not_null())
        .col(ColumnDef::new(Comments::Content).text().not_null())
        .col(
            ColumnDef::new(Comments::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Comments::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_comments_post")
                .from(Comments::Table, Comments::PostId)
                .to(Posts::Table, Posts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_comments_user")
                .from(Comments::Table, Comments::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn follows_table() -> TableCreateStatement {
    Table::create()
        .table(Follows::Table)
        .if_not_exists()
        .col(ColumnDef::new(Follows::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Follows::FollowerId).uuid().not_null())
        .col(ColumnDef::new(Follows::FollowingId).uuid().not_null())
        .col(
            ColumnDef::new(Follows::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_follows_follower")
                .from(Follows::Table, Follows::FollowerId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_follows_following")
                .from(Follows::Table, Follows::FollowingId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Thread reads filter on the post and sort newest-first, so the index
/// carries both.
fn comments_thread_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_comments_post_created")
        .table(Comments::Table)
        .col(Comments::PostId)
        .col((Comments::CreatedAt, IndexOrder::Desc))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(users_table()).await?;
        manager.create_table(posts_table()).await?;
        manager.create_table(likes_table()).await?;
        manager.create_table(comments_table()).await?;
        manager.create_table(follows_table()).await?;

        // Self-follows are rejected at the store level as well.
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE follows ADD CONSTRAINT chk_follows_no_self \
                 CHECK (follower_id <> following_id)",
            )
            .await?;

        // One like / one follow per pair.
        manager
            .create_index(
                Index::create()
                    .name("uq_likes_post_user")
                    .table(Likes::Table)
                    .col(Likes::PostId)
                    .col(Likes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_follows_pair")
                    .table(Follows::Table)
                    .col(Follows::FollowerId)
                    .col(Follows::FollowingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Hot read paths: feed pagination, per-author pages, thread reads.
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_user_id")
                    .table(Posts::Table)
                    .col(Posts::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_created_at")
                    .table(Posts::Table)
                    .col((Posts::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_likes_user_id")
                    .table(Likes::Table)
                    .col(Likes::UserId)
                    .to_owned(),
            )
            .await?;
        manager.create_index(comments_thread_index()).await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_follows_following_id")
                    .table(Follows::Table)
                    .col(Follows::FollowingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Likes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    SubjectId,
    Name,
    ProfileImageUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    ImageUrl,
    Caption,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Likes {
    Table,
    Id,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    UserId,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Follows {
    Table,
    Id,
    FollowerId,
    FollowingId,
    CreatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The column sets here must stay in sync with the mapped entities;
    // a drifted column fails every read and write of that table.
    #[test]
    fn comments_table_matches_entity_columns() {
        let sql = comments_table().to_string(PostgresQueryBuilder);
        for column in [
            "\"id\"",
            "\"post_id\"",
            "\"user_id\"",
            "\"content\"",
            "\"created_at\"",
            "\"updated_at\"",
        ] {
            assert!(sql.contains(column), "comments missing {column}: {sql}");
        }
    }

    #[test]
    fn posts_table_matches_entity_columns() {
        let sql = posts_table().to_string(PostgresQueryBuilder);
        for column in [
            "\"id\"",
            "\"user_id\"",
            "\"image_url\"",
            "\"caption\"",
            "\"created_at\"",
            "\"updated_at\"",
        ] {
            assert!(sql.contains(column), "posts missing {column}: {sql}");
        }
    }

    #[test]
    fn comment_thread_index_orders_newest_first() {
        let sql = comments_thread_index().to_string(PostgresQueryBuilder);
        assert!(sql.contains("\"post_id\""), "{sql}");
        assert!(sql.contains("\"created_at\" DESC"), "{sql}");
    }
}
