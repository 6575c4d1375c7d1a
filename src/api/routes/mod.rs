//! API Routes
//!
//! Route handlers organized by functionality.

pub mod apple_health;
pub mod chat;
pub mod health;
pub mod health_data;
pub mod journal;
