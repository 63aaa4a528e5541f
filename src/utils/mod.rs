// Shared helpers: password hashing, request validation, the service error

pub mod password;
pub mod service_error;
pub mod validation;

pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
pub use service_error::{ServiceError, ServiceResult};
pub use validation::{trim_optional, trim_required};
