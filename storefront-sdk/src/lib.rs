//! Shared types and HTTP client for the storefront API.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
