//! Read-only access to bookings.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use super::entities::booking::{self, Entity as BookingEntity};
use crate::errors::{AppError, AppResult};
use domain::ACTIVE_BOOKING_STATUSES;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings of a service that are pending, confirmed or in progress
    async fn count_active_for_service(&self, service_id: Uuid) -> AppResult<u64>;
}

pub struct BookingStore {
    db: DatabaseConnection,
}

impl BookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingRepository for BookingStore {
    async fn count_active_for_service(&self, service_id: Uuid) -> AppResult<u64> {
        BookingEntity::find()
            .filter(booking::Column::ServiceId.eq(service_id))
            .filter(booking::Column::Status.is_in(ACTIVE_BOOKING_STATUSES.iter().copied()))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }
}
