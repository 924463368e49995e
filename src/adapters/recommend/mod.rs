//! Recommendation adapters. Implement RecommendationPort.
//!
//! HTTP client for the live service and a static adapter for offline runs.

pub mod http_client;
pub mod static_adapter;

pub use http_client::HttpRecommendClient;
pub use static_adapter::StaticRecommendations;
