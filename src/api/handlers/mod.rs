//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod category_handler;
pub mod contractor_handler;
pub mod service_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use category_handler::category_routes;
pub use contractor_handler::contractor_routes;
pub use service_handler::service_routes;
pub use user_handler::user_routes;
