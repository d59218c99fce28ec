//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginatedServices, PaginationMeta, PaginationParams};
pub use response::{Created, NoContent};
