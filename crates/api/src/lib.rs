//! RankBag API server library.
//!
//! Exposes the building blocks (config, state, error handling, session
//! store, routes, background workers) so integration tests and the binary
//! entrypoint can both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod session;
pub mod state;
