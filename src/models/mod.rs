//! Data models for AniBlog entities.
//!
//! This module contains the domain types exchanged with the AniBlog API:
//!
//! - `User`, `Credentials`, `SignUpForm`, `ProfileUpdate`: identity and auth forms
//! - `Post`, `PostDraft`, `PostQuery`, `PostDetail`: blog posts and listing filters
//! - `Comment`: comments attached to a post
//!
//! Wire wrappers (`PostsResponse`, `UserResponse`, ...) mirror the envelope
//! shapes the server uses (`{"posts": [...]}`, `{"user": {...}}`) so every
//! endpoint decodes into an explicit schema.

pub mod post;
pub mod user;

pub use post::{
    Comment, CommentResponse, CommentsResponse, LikesResponse, Post, PostDetail, PostDraft,
    PostQuery, PostResponse, PostsResponse, SuggestedTagsResponse,
};
pub use user::{Credentials, ProfileUpdate, SignUpForm, User, UserResponse};
