//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. Each one is a trait (what handlers depend on)
//! with a `*Manager`-style implementation generic over the [`UnitOfWork`].
//!
//! [`UnitOfWork`]: crate::infra::UnitOfWork

mod address_service;
mod auth_service;
mod catalog_service;
mod category_service;
pub mod container;
mod contractor_service;
mod image_service;
mod location_service;
mod user_service;

pub use container::{parallel, ServiceContainer, Services};

pub use address_service::{AddressDraft, AddressManager, AddressService, AddressUpdate};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use catalog_service::{CatalogService, ServiceCatalog, ServiceDraft};
pub use category_service::{CategoryCatalog, CategoryService};
pub use contractor_service::{ContractorManager, ContractorService, ProfileDraft};
pub use image_service::{ImageManager, ImageService, ImageUpload};
pub use location_service::{LocationChanges, LocationInput, LocationManager, LocationService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
