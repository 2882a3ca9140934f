//! The remote specs catalog: domain types, wire types and the HTTP client.

pub mod api_types;
pub mod cache;
pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use cache::CacheKey;
pub use client::{SpecsApi, SpecsClient};
pub use types::{ListSpecsQuery, LookupKind, Page, Spec};
