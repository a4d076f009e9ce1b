//! Load test for the OPTIKORM backend.
//!
//! Two simulated user profiles run on the [`swarm`] harness:
//!
//! - [`OptikormUser`](users::OptikormUser) registers (or logs in) a unique admin account, seeds a
//!   nutrient, a fish and a feed, then lists resources, calls the calculation endpoint and pings
//!   the API root with weights 3:2:1.
//! - [`SimpleReader`](users::SimpleReader) lists nutrients anonymously with no pacing.
//!
//! Every request is a transaction: its status code decides pass or fail, and nothing a request
//! returns ever stops a user.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod requests;
pub mod runner;
pub mod seed;
pub mod session;
pub mod users;

pub use auth::{AuthOutcome, AuthToken};
pub use client::ApiClient;
pub use config::{Cli, LoadConfig, Profile, RunSettings};
pub use error::ApiError;
pub use seed::ResourceIds;
pub use session::Session;
pub use users::{OptikormUser, SimpleReader};
