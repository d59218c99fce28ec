//! Domain layer - Core business entities and rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the service visibility state machine, the location privacy filter, and the
//! entities they operate on.

pub mod address;
pub mod constants;
pub mod contractor;
pub mod error;
pub mod location;
pub mod password;
pub mod service;
pub mod user;
pub mod visibility;

pub use address::{
    can_remove_address, next_default_address, sort_address_book, UserAddress, UserAddressResponse,
};
pub use constants::*;
pub use contractor::{ContractorProfile, ContractorProfileResponse};
pub use error::{DomainError, DomainResult};
pub use location::{
    round_coordinate, Address, ContractorLocation, Coordinates, FullLocation, GeocodingStatus,
    LocationView, PublicLocation, ServiceZone,
};
pub use password::Password;
pub use service::{
    build_category_tree, Category, CategoryNode, Service, ServiceImage, ServiceImageResponse,
    ServiceResponse, ServiceStatus,
};
pub use user::{Actor, PublicUserProfile, User, UserResponse, UserRole};
pub use visibility::{
    authorize, plan_transition, publication_requirements, ServiceAction, TransitionFacts,
    UnmetRequirement,
};
