#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use lumen_core::domain::{Post, User};
    use lumen_core::ports::{
        BaseRepository, FollowRepository, LikeRepository, PostRepository, UserRepository,
    };

    use crate::database::entity::{like, post, post_stats, user};
    use crate::database::postgres_repo::{
        PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
        PostgresUserRepository,
    };

    fn post_model(post_id: Uuid, user_id: Uuid) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id: post_id,
            user_id,
            image_url: "https://img.example/p.jpg".to_owned(),
            caption: Some("hello".to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_post_by_id() {
        let post_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, user_id)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.id, post_id);
        assert_eq!(post.caption.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn find_user_by_subject() {
        let user_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                subject_id: "subj_42".to_owned(),
                name: "ann".to_owned(),
                profile_image_url: None,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let result: Option<User> = repo.find_by_subject("subj_42").await.unwrap();

        let user = result.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.subject_id, "subj_42");
    }

    #[tokio::test]
    async fn stats_for_maps_view_rows() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_stats::Model {
                post_id,
                likes_count: 3,
                comments_count: 7,
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let stats = repo.stats_for(&[post_id]).await.unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].likes_count, 3);
        assert_eq!(stats[0].comments_count, 7);
    }

    #[tokio::test]
    async fn stats_for_empty_ids_skips_query() {
        // No expectations appended: a query would make the mock panic.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);

        let stats = repo.stats_for(&[]).await.unwrap();

        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn liked_post_ids_filters_to_viewer() {
        let user_id = Uuid::new_v4();
        let liked = Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![like::Model {
                id: Uuid::new_v4(),
                post_id: liked,
                user_id,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresLikeRepository::new(db);

        let ids = repo
            .liked_post_ids(user_id, &[liked, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(ids, vec![liked]);
    }

    #[tokio::test]
    async fn unlike_reports_rows_removed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresLikeRepository::new(db);

        let removed = repo.delete_pair(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn unfollow_with_no_row_is_not_an_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresFollowRepository::new(db);

        let removed = repo.delete_pair(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();

        assert_eq!(removed, 0);
    }
}
