//! Admission portal web server library.
//!
//! Exposes config, state, error handling, the wizard and the routes so the
//! binary entrypoint and the integration tests build the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod tabs;
pub mod wizard;
