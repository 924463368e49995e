//! board-game-bot: answers `#RecommendGames for <user>` statuses with game recommendations.
//!
//! Hexagonal layout: the status processor in `usecases` only talks to ports; platform
//! clients and the recommendation service live in `adapters`.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
