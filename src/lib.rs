//! # chirp
//!
//! Client-side session and request-authorization layer for the Chirp
//! social network.
//!
//! This crate holds the session manager, the authorized REST client, the
//! stored-credential slot, route guards, and the per-view state the `chirp`
//! CLI drives. Nothing here renders; callers decide how to present the
//! results.

pub mod config;
pub mod forms;
pub mod net;
pub mod router;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
