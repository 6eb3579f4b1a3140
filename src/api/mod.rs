//! API layer: wire types and their encoding.

pub mod envelope;
pub mod models;
pub mod rest_error;
pub mod serialization;
pub mod traits;

pub use envelope::{EmptyResponse, Envelope, ItemResponse, ListResponse, PagedResponse};
pub use rest_error::RestError;
pub use serialization::{HttpContentSerializer, MediaType};
