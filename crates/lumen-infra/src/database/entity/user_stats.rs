//! Read-only entity over the `user_stats` view.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for lumen_core::domain::UserStats {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            posts_count: model.posts_count,
            followers_count: model.followers_count,
            following_count: model.following_count,
        }
    }
}
