//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use super::corrupt_column;
use crate::errors::AppError;
use domain::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::contractor_profile::Entity")]
    ContractorProfile,
    #[sea_orm(has_many = "super::user_address::Entity")]
    Addresses,
}

impl Related<super::contractor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractorProfile.def()
    }
}

impl Related<super::user_address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addresses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role: UserRole = model
            .role
            .parse()
            .map_err(|_| corrupt_column("users", "role", &model.role))?;

        Ok(User {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            name: model.name,
            phone: model.phone,
            avatar_url: model.avatar_url,
            role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
