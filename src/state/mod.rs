//! Client-side session and view state.
//!
//! DESIGN
//! ======
//! `session` owns who is signed in, `token` persists the credential between
//! runs, `auth` is the snapshot views observe, and `feed` holds the small
//! per-view models whose actions go through the session.

pub mod auth;
pub mod feed;
pub mod session;
pub mod token;
