//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub subject_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub profile_image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::like::Entity")]
    Like,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for lumen_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            subject_id: model.subject_id,
            name: model.name,
            profile_image_url: model.profile_image_url,
            created_at: model.created_at.into(),
        }
    }
}

impl From<lumen_core::domain::User> for ActiveModel {
    fn from(user: lumen_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            subject_id: Set(user.subject_id),
            name: Set(user.name),
            profile_image_url: Set(user.profile_image_url),
            created_at: Set(user.created_at.into()),
        }
    }
}
