//! Service image database entity.

use sea_orm::entity::prelude::*;

use domain::ServiceImage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    #[sea_orm(unique)]
    pub storage_key: String,
    pub url: String,
    pub position: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub alt_text: Option<String>,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id",
        on_delete = "Cascade"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceImage {
    fn from(model: Model) -> Self {
        ServiceImage {
            id: model.id,
            service_id: model.service_id,
            storage_key: model.storage_key,
            url: model.url,
            position: model.position,
            width: model.width,
            height: model.height,
            alt_text: model.alt_text,
            uploaded_at: model.uploaded_at,
        }
    }
}
