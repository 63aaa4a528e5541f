// Postgres connection pool

pub mod diesel_pool;

pub use diesel_pool::{create_diesel_pool, mask_connection_string, DieselDatabaseConfig, DieselPool};
