//! Shared fixtures for service-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domain::{
    Address, ContractorLocation, ContractorProfile, Coordinates, GeocodingStatus, Service,
    ServiceImage, ServiceStatus, ServiceZone, User, UserAddress, UserRole,
};
use reparaya::infra::repositories::{
    AddressRepository, BookingRepository, CategoryRepository, ContractorProfileRepository,
    LocationRepository, MockAddressRepository, MockBookingRepository, MockCategoryRepository,
    MockContractorProfileRepository, MockLocationRepository, MockServiceImageRepository,
    MockServiceRepository, MockUserRepository, ServiceImageRepository, ServiceRepository,
    UserRepository,
};
use reparaya::infra::UnitOfWork;

/// Repository mocks to configure before building a [`TestUnitOfWork`].
///
/// A mock without expectations panics when called, so each test only sets
/// up the repositories its code path is allowed to touch.
#[derive(Default)]
pub struct Repos {
    pub users: MockUserRepository,
    pub addresses: MockAddressRepository,
    pub contractors: MockContractorProfileRepository,
    pub locations: MockLocationRepository,
    pub categories: MockCategoryRepository,
    pub services: MockServiceRepository,
    pub images: MockServiceImageRepository,
    pub bookings: MockBookingRepository,
}

impl Repos {
    pub fn build(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            addresses: Arc::new(self.addresses),
            contractors: Arc::new(self.contractors),
            locations: Arc::new(self.locations),
            categories: Arc::new(self.categories),
            services: Arc::new(self.services),
            images: Arc::new(self.images),
            bookings: Arc::new(self.bookings),
        })
    }
}

/// UnitOfWork over mockall repositories
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    addresses: Arc<MockAddressRepository>,
    contractors: Arc<MockContractorProfileRepository>,
    locations: Arc<MockLocationRepository>,
    categories: Arc<MockCategoryRepository>,
    services: Arc<MockServiceRepository>,
    images: Arc<MockServiceImageRepository>,
    bookings: Arc<MockBookingRepository>,
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.addresses.clone()
    }

    fn contractors(&self) -> Arc<dyn ContractorProfileRepository> {
        self.contractors.clone()
    }

    fn locations(&self) -> Arc<dyn LocationRepository> {
        self.locations.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.categories.clone()
    }

    fn services(&self) -> Arc<dyn ServiceRepository> {
        self.services.clone()
    }

    fn images(&self) -> Arc<dyn ServiceImageRepository> {
        self.images.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.bookings.clone()
    }
}

pub fn user(id: Uuid, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id,
        email: "ana@example.com".to_string(),
        password_hash: "hashed".to_string(),
        name: "Ana López".to_string(),
        phone: None,
        avatar_url: None,
        role,
        created_at: now,
        updated_at: now,
    }
}

pub fn profile(id: Uuid, user_id: Uuid, verified: bool) -> ContractorProfile {
    let now = Utc::now();
    ContractorProfile {
        id,
        user_id,
        business_name: "Plomería Hernández".to_string(),
        description: "Reparaciones de plomería en general".to_string(),
        specialties: vec!["plomería".to_string()],
        verified,
        created_at: now,
        updated_at: now,
    }
}

/// A listing that meets every content requirement for publication
pub fn service(id: Uuid, owner: Uuid, status: ServiceStatus) -> Service {
    let now = Utc::now();
    Service {
        id,
        contractor_id: owner,
        category_id: Some(Uuid::new_v4()),
        title: "Reparación de fugas".to_string(),
        description:
            "Detección y reparación de fugas en tuberías de cobre y PVC, incluye material básico."
                .to_string(),
        base_price_cents: 45_000,
        currency: "MXN".to_string(),
        duration_minutes: 90,
        status,
        last_published_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn with_status(mut service: Service, status: ServiceStatus) -> Service {
    service.status = status;
    service.updated_at = Utc::now();
    service
}

pub fn image(service_id: Uuid, position: i32) -> ServiceImage {
    ServiceImage {
        id: Uuid::new_v4(),
        service_id,
        storage_key: format!("services/{}/{}.jpg", service_id, position),
        url: format!(
            "https://cdn.example.com/services/{}/{}.jpg",
            service_id, position
        ),
        position,
        width: Some(1200),
        height: Some(800),
        alt_text: None,
        uploaded_at: Utc::now(),
    }
}

pub fn address() -> Address {
    Address {
        street: "Av. Reforma".to_string(),
        exterior_number: "222".to_string(),
        interior_number: Some("3B".to_string()),
        neighborhood: Some("Juárez".to_string()),
        city: "Ciudad de México".to_string(),
        state: "CDMX".to_string(),
        postal_code: "06600".to_string(),
        country: "MX".to_string(),
    }
}

pub fn location(profile_id: Uuid) -> ContractorLocation {
    let now = Utc::now();
    ContractorLocation {
        id: Uuid::new_v4(),
        contractor_profile_id: profile_id,
        address: address(),
        coordinates: Some(Coordinates {
            latitude: 19.427_025,
            longitude: -99.167_661,
        }),
        normalized_address: Some("Av. Paseo de la Reforma 222, Juárez, CDMX".to_string()),
        timezone: Some("America/Mexico_City".to_string()),
        geocoding_status: GeocodingStatus::Success,
        service_zone: ServiceZone::Radius { radius_km: 15 },
        created_at: now,
        updated_at: now,
    }
}

/// Saved client address created `age_days` ago
pub fn user_address(user_id: Uuid, is_default: bool, age_days: i64) -> UserAddress {
    let created_at = Utc::now() - chrono::Duration::days(age_days);
    UserAddress {
        id: Uuid::new_v4(),
        user_id,
        address_line1: "Av. Insurgentes Sur 1234".to_string(),
        address_line2: None,
        city: "Ciudad de México".to_string(),
        state: "CDMX".to_string(),
        postal_code: "03100".to_string(),
        country: "MX".to_string(),
        is_default,
        created_at,
        updated_at: created_at,
    }
}
