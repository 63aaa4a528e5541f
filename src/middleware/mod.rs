// Request middleware: bearer token validation and caller extractors

pub mod auth;
pub mod auth_middleware;

pub use auth::{AdminUser, AuthenticatedUser};
pub use auth_middleware::auth_middleware;
