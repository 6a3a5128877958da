//! HTTP surface of the Roster tracker.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** over students, courses and enrollments, each a thin
//!   wrapper around one [`Repository`](roster_db::Repository) call
//! - **Statistics endpoints** (`/stats`, `/courses/{id}/stats`) that load
//!   fresh snapshots and run them through [`roster_stats`]
//! - **HTML dashboard** (`GET /dashboard`) rendering the same statistics
//!   with stat cards, a top-courses table, the grade distribution and the
//!   monthly trend series
//!
//! # Architecture
//!
//! Handlers hold no state of their own. Every request goes to the
//! repository in [`AppState`], so a read issued after a successful write
//! always sees it.

pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
