//! Aaraazi API access: HTTP client, failures, records and resource services.

pub mod client;
pub mod failure;
pub mod resources;
pub mod service;
pub mod types;

pub use client::ApiClient;
pub use failure::Failure;
pub use service::{CreateService, HttpService, Resource, ResourceService, UpdateService};
