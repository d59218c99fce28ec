//! Service image registry.
//!
//! Files are uploaded to object storage out of band; this service records
//! them against a listing, enforces the per-listing limit and hands out
//! positions in upload order.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::NewServiceImage;
use crate::infra::UnitOfWork;
use domain::{Actor, Service, ServiceImage, MAX_IMAGES_PER_SERVICE};

/// An uploaded file to attach to a listing
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub storage_key: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub alt_text: Option<String>,
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn add_image(
        &self,
        actor: &Actor,
        service_id: Uuid,
        upload: ImageUpload,
    ) -> AppResult<ServiceImage>;

    /// Images in position order, visible to whoever can see the listing
    async fn list_images(
        &self,
        viewer: Option<&Actor>,
        service_id: Uuid,
    ) -> AppResult<Vec<ServiceImage>>;

    async fn delete_image(&self, actor: &Actor, service_id: Uuid, image_id: Uuid) -> AppResult<()>;
}

const IMAGE_INSERT_ATTEMPTS: u32 = 2;

/// Slot after the highest position in use.
fn next_position(images: &[ServiceImage]) -> i32 {
    images.iter().map(|i| i.position + 1).max().unwrap_or(0)
}

pub struct ImageManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ImageManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Listing owned by `actor` that still accepts edits.
    async fn editable_service(&self, actor: &Actor, service_id: Uuid) -> AppResult<Service> {
        let service = self
            .uow
            .services()
            .find_by_id(service_id)
            .await?
            .ok_or_not_found()?;
        if !service.is_owned_by(actor) {
            return Err(AppError::forbidden("You do not own this service"));
        }
        if service.status.is_terminal() {
            return Err(AppError::Conflict(
                "Images of archived services cannot be changed".into(),
            ));
        }
        Ok(service)
    }
}

#[async_trait]
impl<U: UnitOfWork> ImageService for ImageManager<U> {
    async fn add_image(
        &self,
        actor: &Actor,
        service_id: Uuid,
        upload: ImageUpload,
    ) -> AppResult<ServiceImage> {
        self.editable_service(actor, service_id).await?;

        let images = self.uow.images();
        let mut record = NewServiceImage {
            service_id,
            storage_key: upload.storage_key,
            url: upload.url,
            position: 0,
            width: upload.width,
            height: upload.height,
            alt_text: upload.alt_text.map(|s| s.trim().to_string()),
        };

        let mut attempt = 1;
        loop {
            let existing = images.list_by_service(service_id).await?;
            if existing.len() as u64 >= MAX_IMAGES_PER_SERVICE {
                return Err(AppError::Conflict(format!(
                    "A service can have at most {} images",
                    MAX_IMAGES_PER_SERVICE
                )));
            }
            record.position = next_position(&existing);

            match images.create(record.clone()).await {
                Ok(image) => {
                    tracing::info!(%service_id, image_id = %image.id, position = image.position, "Service image registered");
                    return Ok(image);
                }
                // A concurrent upload took the slot; re-read and try the next one
                Err(AppError::Conflict(_)) if attempt < IMAGE_INSERT_ATTEMPTS => {
                    tracing::debug!(%service_id, position = record.position, "Image position taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list_images(
        &self,
        viewer: Option<&Actor>,
        service_id: Uuid,
    ) -> AppResult<Vec<ServiceImage>> {
        let service = self
            .uow
            .services()
            .find_by_id(service_id)
            .await?
            .ok_or_not_found()?;
        if !service.is_visible_to(viewer) {
            return Err(AppError::NotFound);
        }
        self.uow.images().list_by_service(service_id).await
    }

    async fn delete_image(&self, actor: &Actor, service_id: Uuid, image_id: Uuid) -> AppResult<()> {
        self.editable_service(actor, service_id).await?;

        let images = self.uow.images();
        let image = images.find_by_id(image_id).await?.ok_or_not_found()?;
        if image.service_id != service_id {
            return Err(AppError::NotFound);
        }
        images.delete(image_id).await?;

        tracing::info!(%service_id, %image_id, "Service image deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn image(position: i32) -> ServiceImage {
        ServiceImage {
            id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            storage_key: format!("services/x/{position}.jpg"),
            url: format!("https://cdn.example.com/{position}.jpg"),
            position,
            width: None,
            height: None,
            alt_text: None,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(&[]), 0);
        assert_eq!(next_position(&[image(0), image(1)]), 2);
        // gaps left by deletions are not reused
        assert_eq!(next_position(&[image(0), image(3)]), 4);
    }
}
