//! Service listing database entity.

use sea_orm::entity::prelude::*;

use super::corrupt_column;
use crate::errors::AppError;
use domain::{Service, ServiceStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub base_price_cents: i64,
    pub currency: String,
    pub duration_minutes: i32,
    pub status: String,
    pub last_published_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ContractorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Contractor,
    #[sea_orm(
        belongs_to = "super::service_category::Entity",
        from = "Column::CategoryId",
        to = "super::service_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::service_image::Entity")]
    Images,
}

impl Related<super::service_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::service_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Service {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status: ServiceStatus = model
            .status
            .parse()
            .map_err(|_| corrupt_column("services", "status", &model.status))?;

        Ok(Service {
            id: model.id,
            contractor_id: model.contractor_id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            base_price_cents: model.base_price_cents,
            currency: model.currency,
            duration_minutes: model.duration_minutes,
            status,
            last_published_at: model.last_published_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
