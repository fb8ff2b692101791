//! Database gateway: the only place list filters become database queries.

pub mod error;
pub mod gateway;
pub mod query;

pub use error::{GatewayError, ServiceError};
pub use gateway::{Gateway, Rows};
