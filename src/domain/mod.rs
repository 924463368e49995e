//! Core domain layer. No network I/O.
//!
//! Entities, the command parser and the response composer live here.

pub mod command;
pub mod entities;
pub mod errors;
pub mod response;

pub use command::CommandParser;
pub use entities::{
    InboundStatus, MediaAttachment, MediaId, ProcessResult, RecommendationItem,
    RecommendationQuery,
};
pub use errors::DomainError;
pub use response::{ResponseComposer, truncate};
