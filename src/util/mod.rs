//! Helpers shared by the session manager and its callers.

pub mod auth;
