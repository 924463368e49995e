//! Application use cases. Orchestrate domain logic via ports.

pub mod image_resolver;
pub mod listener_service;
pub mod status_processor;

pub use image_resolver::ImageResolver;
pub use listener_service::{HandleOutcome, RecommendListener};
pub use status_processor::StatusProcessor;
