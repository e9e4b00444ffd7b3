use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Counter views read by the aggregation layer. DISTINCT keeps the
        // double left join from multiplying counts.
        conn.execute_unprepared(
            r#"
            CREATE VIEW post_stats AS
            SELECT
                p.id AS post_id,
                COUNT(DISTINCT l.id) AS likes_count,
                COUNT(DISTINCT c.id) AS comments_count
            FROM posts p
            LEFT JOIN likes l ON l.post_id = p.id
            LEFT JOIN comments c ON c.post_id = p.id
            GROUP BY p.id
            "#,
        )
        .await?;

        conn.execute_unprepared(
            r#"
            CREATE VIEW user_stats AS
            SELECT
                u.id AS user_id,
                (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS posts_count,
                (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers_count,
                (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count
            FROM users u
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP VIEW IF EXISTS user_stats").await?;
        conn.execute_unprepared("DROP VIEW IF EXISTS post_stats").await?;
        Ok(())
    }
}
