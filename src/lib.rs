//! Financial Literacy Arcade
//!
//! Backend for a kids' money-skills app:
//! - Treasure Coin Hunt: collect coins and notes, then pick what they can buy
//! - Chore Adventure: earn coins for chores and spend them in a shop
//! - Currency converter with an offline fallback rate table
//! - Budget, expense and health-score dashboards
//! - Launcher that installs and starts the desktop version of a game
//!
//! Game engines are synchronous state machines; the HTTP layer hosts them
//! as sessions and persists player progress between sessions.

pub mod api;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod games;
pub mod launcher;
pub mod models;
pub mod progress;
pub mod sessions;

pub use error::Result;

// Re-export common types
pub use config::ArcadeConfig;
pub use models::*;
