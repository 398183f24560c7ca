//! Ayon API client
//!
//! Typed request/response definitions and endpoint bindings for the parts of
//! the Ayon REST and GraphQL API used by the product browser.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod graphql;
pub mod types;

// Re-export commonly used types and traits
pub use client::AyonClient;
pub use endpoints::AyonApi;
pub use error::{ApiError, ApiResult};
pub use types::{
    OperationRequest, OperationResponse, OperationType, OperationsRequest, OperationsResponse,
    VersionEntity, VersionPatch,
};
