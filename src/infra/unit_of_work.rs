//! Unit of Work - repository hub.
//!
//! Services receive one `Arc<dyn UnitOfWork>` and reach every repository
//! through it. Multi-step writes that must not interleave rely on the
//! compare-and-set methods of the repositories instead of long-lived
//! transactions, which keeps this trait object safe and easy to fake.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    AddressRepository, AddressStore, BookingRepository, BookingStore, CategoryRepository,
    CategoryStore, ContractorProfileRepository, ContractorProfileStore, LocationRepository,
    LocationStore, ServiceImageRepository, ServiceImageStore, ServiceRepository, ServiceStore,
    UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn addresses(&self) -> Arc<dyn AddressRepository>;

    fn contractors(&self) -> Arc<dyn ContractorProfileRepository>;

    fn locations(&self) -> Arc<dyn LocationRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn services(&self) -> Arc<dyn ServiceRepository>;

    fn images(&self) -> Arc<dyn ServiceImageRepository>;

    fn bookings(&self) -> Arc<dyn BookingRepository>;
}

/// SeaORM-backed UnitOfWork sharing one connection pool
pub struct Persistence {
    user_repo: Arc<UserStore>,
    address_repo: Arc<AddressStore>,
    contractor_repo: Arc<ContractorProfileStore>,
    location_repo: Arc<LocationStore>,
    category_repo: Arc<CategoryStore>,
    service_repo: Arc<ServiceStore>,
    image_repo: Arc<ServiceImageStore>,
    booking_repo: Arc<BookingStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            address_repo: Arc::new(AddressStore::new(db.clone())),
            contractor_repo: Arc::new(ContractorProfileStore::new(db.clone())),
            location_repo: Arc::new(LocationStore::new(db.clone())),
            category_repo: Arc::new(CategoryStore::new(db.clone())),
            service_repo: Arc::new(ServiceStore::new(db.clone())),
            image_repo: Arc::new(ServiceImageStore::new(db.clone())),
            booking_repo: Arc::new(BookingStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.address_repo.clone()
    }

    fn contractors(&self) -> Arc<dyn ContractorProfileRepository> {
        self.contractor_repo.clone()
    }

    fn locations(&self) -> Arc<dyn LocationRepository> {
        self.location_repo.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.category_repo.clone()
    }

    fn services(&self) -> Arc<dyn ServiceRepository> {
        self.service_repo.clone()
    }

    fn images(&self) -> Arc<dyn ServiceImageRepository> {
        self.image_repo.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.booking_repo.clone()
    }
}
