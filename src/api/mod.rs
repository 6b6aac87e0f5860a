//! REST API client module for the AniBlog backend.
//!
//! This module provides the `ApiClient` for communicating with the AniBlog
//! API: authentication, posts, comments, likes, tag suggestions, and user
//! profiles.
//!
//! The API uses JWT bearer token authentication; the token is read from the
//! shared `SessionStore` immediately before every request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
