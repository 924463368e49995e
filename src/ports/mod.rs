//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: status sources feeding the listener
//! - Outbound: recommendation service and platform write APIs

pub mod inbound;
pub mod outbound;

pub use inbound::{StatusSource, TextExtractor};
pub use outbound::{RecommendationPort, ReplyPoster};
