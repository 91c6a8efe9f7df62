//! 2048 Board Core Library
//!
//! Deterministic board simulation for the sliding-tile game:
//! - Tile animation state machine (slide, spawn grow, merge pop)
//! - Move resolution with at-most-one merge per tile
//! - Seeded random spawning
//! - Frame-driven task sequencing (await settle, commit and spawn)
//! - Renderer-facing sprite geometry
//! - Bevy plugin hosting a board as a resource
//! - Parallel seeded simulations for soak runs

pub mod arena;
pub mod board;
pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod logging;
pub mod movement;
pub mod plugin;
pub mod render;
pub mod simulation;
pub mod spawn;
pub mod tile;
