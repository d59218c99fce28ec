//! Contractor profile database entity.

use sea_orm::entity::prelude::*;

use domain::ContractorProfile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contractor_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub business_name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// JSON array of strings
    pub specialties: Json,
    pub verified: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_one = "super::contractor_location::Entity")]
    Location,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::contractor_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ContractorProfile {
    fn from(model: Model) -> Self {
        // Non-string entries are dropped rather than failing the whole read.
        let specialties = model
            .specialties
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        ContractorProfile {
            id: model.id,
            user_id: model.user_id,
            business_name: model.business_name,
            description: model.description,
            specialties,
            verified: model.verified,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
