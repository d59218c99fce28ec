//! Service image repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::service_image::{self, ActiveModel, Entity as ImageEntity};
use crate::errors::{AppError, AppResult};
use domain::ServiceImage;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Conflict message when another upload claimed the same position
pub const IMAGE_SLOT_TAKEN: &str = "Another image was registered for this service at the same time";

/// Metadata of an image already uploaded to object storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceImage {
    pub service_id: Uuid,
    pub storage_key: String,
    pub url: String,
    pub position: i32,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub alt_text: Option<String>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ServiceImageRepository: Send + Sync {
    /// Images of a service ordered by position
    async fn list_by_service(&self, service_id: Uuid) -> AppResult<Vec<ServiceImage>>;

    async fn count_by_service(&self, service_id: Uuid) -> AppResult<u64>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceImage>>;

    /// Insert at `image.position`; a taken position is `Conflict`
    async fn create(&self, image: NewServiceImage) -> AppResult<ServiceImage>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct ServiceImageStore {
    db: DatabaseConnection,
}

impl ServiceImageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ServiceImageRepository for ServiceImageStore {
    async fn list_by_service(&self, service_id: Uuid) -> AppResult<Vec<ServiceImage>> {
        let models = ImageEntity::find()
            .filter(service_image::Column::ServiceId.eq(service_id))
            .order_by_asc(service_image::Column::Position)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(ServiceImage::from).collect())
    }

    async fn count_by_service(&self, service_id: Uuid) -> AppResult<u64> {
        ImageEntity::find()
            .filter(service_image::Column::ServiceId.eq(service_id))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceImage>> {
        let model = ImageEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(ServiceImage::from))
    }

    async fn create(&self, image: NewServiceImage) -> AppResult<ServiceImage> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(image.service_id),
            storage_key: Set(image.storage_key),
            url: Set(image.url),
            position: Set(image.position),
            width: Set(image.width),
            height: Set(image.height),
            alt_text: Set(image.alt_text),
            uploaded_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, IMAGE_SLOT_TAKEN))?;
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ImageEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
