//! Read-only entity over the `post_stats` view.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: Uuid,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for lumen_core::domain::PostStats {
    fn from(model: Model) -> Self {
        Self {
            post_id: model.post_id,
            likes_count: model.likes_count,
            comments_count: model.comments_count,
        }
    }
}
