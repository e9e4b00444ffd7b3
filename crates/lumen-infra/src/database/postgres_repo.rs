//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use lumen_core::domain::{Comment, Follow, Like, Post, PostStats, User, UserStats};
use lumen_core::error::RepoError;
use lumen_core::ports::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_stats::Entity as PostStatsEntity;
use super::entity::user::{self, Entity as UserEntity};
use super::entity::user_stats::{self, Entity as UserStatsEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL like repository.
pub type PostgresLikeRepository = PostgresBaseRepository<LikeEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

fn into_post_row((post, author): (post::Model, Option<user::Model>)) -> (Post, Option<User>) {
    (post.into(), author.map(Into::into))
}

fn into_comment_row(
    (comment, author): (comment::Model, Option<user::Model>),
) -> (Comment, Option<User>) {
    (comment.into(), author.map(Into::into))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::SubjectId.eq(subject_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn search_by_name(&self, query: &str, limit: u64) -> Result<Vec<User>, RepoError> {
        let pattern = format!("%{query}%");
        let result = UserEntity::find()
            .filter(Expr::col((user::Entity, user::Column::Name)).ilike(pattern))
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn stats(&self, user_id: Uuid) -> Result<Option<UserStats>, RepoError> {
        let result = UserStatsEntity::find()
            .filter(user_stats::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> Result<User, RepoError> {
        let mut active: user::ActiveModel = user::ActiveModel {
            id: Set(user_id),
            ..Default::default()
        };
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(url) = profile_image_url {
            active.profile_image_url = Set(Some(url));
        }

        let model = active.update(self.db.as_ref()).await.map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn page(
        &self,
        limit: u64,
        offset: u64,
        author: Option<Uuid>,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError> {
        let mut query = PostEntity::find().find_also_related(UserEntity);
        if let Some(author) = author {
            query = query.filter(post::Column::UserId.eq(author));
        }

        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(into_post_row).collect())
    }

    async fn count(&self, author: Option<Uuid>) -> Result<u64, RepoError> {
        let mut query = PostEntity::find();
        if let Some(author) = author {
            query = query.filter(post::Column::UserId.eq(author));
        }

        query.count(self.db.as_ref()).await.map_err(map_db_err)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<(Post, Option<User>)>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(row.map(into_post_row))
    }

    async fn search_by_caption(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError> {
        let pattern = format!("%{query}%");
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .filter(Expr::col((post::Entity, post::Column::Caption)).ilike(pattern))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(into_post_row).collect())
    }

    async fn stats_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostStats>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = PostStatsEntity::find()
            .filter(
                super::entity::post_stats::Column::PostId.is_in(post_ids.iter().copied()),
            )
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn find_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        let result = LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<u64, RepoError> {
        let result = LikeEntity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = LikeEntity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.is_in(post_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(|l| l.post_id).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<(Comment, Option<User>)>, RepoError> {
        let rows = CommentEntity::find()
            .find_also_related(UserEntity)
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(into_comment_row).collect())
    }

    async fn list_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<(Comment, Option<User>)>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = CommentEntity::find()
            .find_also_related(UserEntity)
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(into_comment_row).collect())
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn find_pair(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete_pair(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}
