//! Service Container - Centralized service access.
//!
//! Handlers reach every application service through one
//! `Arc<dyn ServiceContainer>`; tests swap in a mock container or build
//! [`Services`] over a fake unit of work.

use std::future::Future;
use std::sync::Arc;

use super::{
    AddressManager, AddressService, AuthService, Authenticator, CatalogService, CategoryCatalog,
    CategoryService, ContractorManager, ContractorService, ImageManager, ImageService,
    LocationManager, LocationService, ServiceCatalog, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Geocoder, Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn addresses(&self) -> Arc<dyn AddressService>;

    fn contractors(&self) -> Arc<dyn ContractorService>;

    fn locations(&self) -> Arc<dyn LocationService>;

    fn categories(&self) -> Arc<dyn CategoryService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn images(&self) -> Arc<dyn ImageService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    address_service: Arc<dyn AddressService>,
    contractor_service: Arc<dyn ContractorService>,
    location_service: Arc<dyn LocationService>,
    category_service: Arc<dyn CategoryService>,
    catalog_service: Arc<dyn CatalogService>,
    image_service: Arc<dyn ImageService>,
}

impl Services {
    /// Wire every service over one unit of work.
    pub fn new<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        config: Config,
        cache: Option<Arc<Cache>>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let default_timezone = config.default_timezone.clone();
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            address_service: Arc::new(AddressManager::new(uow.clone())),
            contractor_service: Arc::new(ContractorManager::new(uow.clone())),
            location_service: Arc::new(LocationManager::new(
                uow.clone(),
                geocoder,
                default_timezone,
            )),
            category_service: Arc::new(CategoryCatalog::new(uow.clone(), cache)),
            catalog_service: Arc::new(ServiceCatalog::new(uow.clone())),
            image_service: Arc::new(ImageManager::new(uow)),
        }
    }

    /// Create service container from a database connection
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Option<Arc<Cache>>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config, cache, geocoder)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressService> {
        self.address_service.clone()
    }

    fn contractors(&self) -> Arc<dyn ContractorService> {
        self.contractor_service.clone()
    }

    fn locations(&self) -> Arc<dyn LocationService> {
        self.location_service.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        self.category_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn images(&self) -> Arc<dyn ImageService> {
        self.image_service.clone()
    }
}

/// Helpers for running independent lookups concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<&'static str> {
            Ok("two")
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "two");
    }

    #[tokio::test]
    async fn test_parallel_join2_propagates_error() {
        let result = parallel::join2(async { Ok::<_, AppError>(1) }, async {
            Err::<i32, _>(AppError::NotFound)
        })
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
