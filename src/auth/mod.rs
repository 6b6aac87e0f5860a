//! Session state and token handling.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for "who is signed in",
//!   persisted across restarts
//! - `token`: extraction of the identity claims carried in a signed token
//!
//! The store holds the token and user identity strictly together; they are
//! written and cleared as a pair.

pub mod session;
pub mod token;

pub use session::{SessionData, SessionStore};
