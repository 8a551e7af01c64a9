//! Client for the Aaraazi real-estate agency API.
//!
//! Screens read records through per-resource caches ([`stores::Stores`]),
//! each a [`cache::ResourceCache`] in front of an HTTP-backed resource
//! service, and observe them through [`query::Query`] handles.

pub mod api;
pub mod app;
pub mod cache;
pub mod commands;
pub mod config;
pub mod logging;
pub mod query;
pub mod stores;
