//! Application configuration, loaded from environment variables.
//!
//! - [`cors`]: allowed origins for the CORS layer
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`session`]: session lifetime

pub mod cors;
pub mod database;
pub mod session;
