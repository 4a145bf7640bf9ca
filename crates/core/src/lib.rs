//! # Orbit Core
//!
//! Domain types and pure logic shared by the Orbit server, the push notifier
//! and the sync client: the user profile model, time-string parsing, water-slot
//! generation, the event-proximity notification evaluator, streak and heatmap
//! reports, and the profile store with injected persistence.

pub mod errors;
pub mod models;
pub mod notify;
pub mod report;
pub mod store;
pub mod time;
pub mod water;
