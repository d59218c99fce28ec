//! Repository layer - Data access abstraction
//!
//! Each aggregate has a trait (mocked in tests) and a SeaORM `*Store`
//! implementation. Stores convert entity models into domain types.

mod address_repository;
mod booking_repository;
mod category_repository;
mod contractor_repository;
pub(crate) mod entities;
mod image_repository;
mod location_repository;
mod service_repository;
mod user_repository;

pub use address_repository::{
    AddressRepository, AddressStore, NewUserAddress, UserAddressChanges, DEFAULT_ADDRESS_TAKEN,
};
pub use booking_repository::{BookingRepository, BookingStore};
pub use category_repository::{CategoryRepository, CategoryStore, NewCategory};
pub use contractor_repository::{
    ContractorProfileChanges, ContractorProfileRepository, ContractorProfileStore,
    NewContractorProfile,
};
pub use image_repository::{NewServiceImage, ServiceImageRepository, ServiceImageStore};
pub use location_repository::{LocationRecord, LocationRepository, LocationStore};
pub use service_repository::{
    AdminServiceFilter, CatalogQuery, NewService, ServiceChanges, ServiceRepository, ServiceStore,
};
pub use user_repository::{UserProfileChanges, UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use address_repository::MockAddressRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use booking_repository::MockBookingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use category_repository::MockCategoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use contractor_repository::MockContractorProfileRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use image_repository::MockServiceImageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use location_repository::MockLocationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use service_repository::MockServiceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
