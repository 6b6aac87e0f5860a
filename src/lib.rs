//! AniBlog client core.
//!
//! Library backing the AniBlog front end: a persisted session store and a
//! typed REST client for the AniBlog API (auth, posts, comments, likes,
//! user profiles).
//!
//! The UI layer owns rendering and navigation; everything here is state and
//! protocol. Construct a [`SessionStore`], hand it to an [`ApiClient`], and
//! call the typed operations:
//!
//! ```no_run
//! use std::sync::Arc;
//! use aniblog_core::{ApiClient, Config, SessionStore};
//! use aniblog_core::models::Credentials;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let session = Arc::new(SessionStore::open(Config::data_dir()?));
//! let api = ApiClient::new(&config, session.clone())?;
//!
//! let user = api
//!     .sign_in(&Credentials {
//!         username: "alice".into(),
//!         password: "secret1".into(),
//!     })
//!     .await?;
//! assert!(session.is_authenticated());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionData, SessionStore};
pub use config::Config;
