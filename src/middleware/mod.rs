//! Request middleware and extractors.
//!
//! [`auth`] resolves the session cookie into the request [`Principal`]
//! (`crate::policy::Principal`); requests without a usable session are
//! rejected before any handler runs.

pub mod auth;
