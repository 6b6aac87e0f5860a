//! API client for the AniBlog REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests for posts, comments, likes, tag suggestions, and user profiles.
//!
//! One `ApiClient` wraps a shared `reqwest::Client` and the `SessionStore`.
//! The bearer token is looked up from the store immediately before every
//! request, never cached, so a login or logout takes effect on the next
//! call. The client performs no retries and no request queuing; a failed
//! request must be re-issued by the caller.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::token::decode_user;
use crate::auth::SessionStore;
use crate::config::Config;
use crate::models::{
    Comment, CommentResponse, CommentsResponse, Credentials, LikesResponse, Post, PostDetail,
    PostDraft, PostQuery, PostResponse, PostsResponse, ProfileUpdate, SignUpForm,
    SuggestedTagsResponse, User, UserResponse,
};

use super::error::ErrorBody;
use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Message used when an auth response carries neither a token nor an error
const DEFAULT_AUTH_ERROR: &str = "Invalid response from server";

/// Auth endpoints return `{token, user?}` on success and `{error}` or
/// `{err}` on failure, so every field is optional here and sorted out in
/// [`extract_auth`].
#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
    #[serde(flatten)]
    error: ErrorBody,
}

/// API client for the AniBlog backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client against the configured base URL
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Build a request for `path`, attaching the bearer token iff a session
    /// exists right now.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Check if a response is successful, surfacing the server's error
    /// message if not. A 401 additionally clears the session: the server no
    /// longer honors the token, so the next request goes out anonymous.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED && self.session.is_authenticated() {
            debug!("Clearing session after 401 response");
            if let Err(e) = self.session.logout() {
                warn!(error = %e, "Failed to clear session after 401");
            }
        }

        Err(ApiError::from_status(status, &body))
    }

    /// Send a request and decode the 2xx body against the expected schema.
    /// A body that does not match is a server contract violation, surfaced
    /// as `Api` with the decode message; `Network` stays reserved for
    /// requests that never completed.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = self.check_response(response).await?;
        let status = response.status();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Api {
            status: status.as_u16(),
            message: format!("unexpected response shape: {e}"),
        })
    }

    /// Send a request whose response body does not matter beyond success
    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        self.check_response(response).await?;
        Ok(())
    }

    // ===== Auth =====

    /// Sign in with existing credentials and establish a session
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.authenticate("/auth/sign-in", credentials).await
    }

    /// Create an account and establish a session
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<User, ApiError> {
        self.authenticate("/auth/sign-up", form).await
    }

    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> Result<User, ApiError> {
        debug!(path, "Submitting credentials");
        let response = self.request(Method::POST, path).json(body).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        // Auth failures come back as `{error}`/`{err}` bodies, so sort the
        // body out before looking at the status code.
        let (token, user) = extract_auth(&text).map_err(|e| match e {
            ApiError::Authentication(ref message)
                if message == DEFAULT_AUTH_ERROR && !status.is_success() =>
            {
                ApiError::from_status(status, &text)
            }
            other => other,
        })?;

        let user = match user {
            Some(user) => user,
            // The primary contract embeds the identity in the token payload
            None => decode_user(&token)?,
        };

        self.session.login(user.clone(), token)?;
        Ok(user)
    }

    /// Ask the server whether the current token is still honored. A 401
    /// clears the session, like any other rejected authenticated request.
    pub async fn verify_token(&self) -> Result<bool, ApiError> {
        let response = self.request(Method::POST, "/verify-token").send().await?;
        match self.check_response(response).await {
            Ok(_) => Ok(true),
            Err(ApiError::Api { status: 401, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ===== Posts =====

    /// List posts, optionally filtered by search text, tag, or author,
    /// with pagination
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ApiError> {
        let request = self.request(Method::GET, "/api/posts").query(query);
        let response: PostsResponse = self.send(request).await?;
        Ok(response.posts)
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let request = self.request(Method::GET, &format!("/api/posts/{id}"));
        let response: PostResponse = self.send(request).await?;
        Ok(response.post)
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ApiError> {
        let request = self.request(Method::POST, "/api/posts").json(draft);
        let response: PostResponse = self.send(request).await?;
        Ok(response.post)
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/api/posts/{id}")))
            .await
    }

    /// Fetch a post together with its comments and like count, issued as
    /// three concurrent requests with no completion-order guarantee.
    pub async fn fetch_post_detail(&self, id: i64) -> Result<PostDetail, ApiError> {
        let (post, comments, like_count) = futures::try_join!(
            self.get_post(id),
            self.list_comments(id),
            self.get_like_count(id),
        )?;
        Ok(PostDetail {
            post,
            comments,
            like_count,
        })
    }

    // ===== Likes =====

    pub async fn like_post(&self, id: i64) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::POST, &format!("/api/posts/{id}/like")))
            .await
    }

    /// Remove a like. Sequenced like/unlike calls are sent as-is; the client
    /// does not deduplicate or merge them.
    pub async fn unlike_post(&self, id: i64) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/api/posts/{id}/like")))
            .await
    }

    pub async fn get_like_count(&self, id: i64) -> Result<u64, ApiError> {
        let request = self.request(Method::GET, &format!("/api/posts/{id}/likes"));
        let response: LikesResponse = self.send(request).await?;
        Ok(response.like_count)
    }

    // ===== Tag suggestions =====

    /// Request AI tag suggestions for draft content
    pub async fn suggest_tags(&self, content: &str) -> Result<Vec<String>, ApiError> {
        let request = self
            .request(Method::POST, "/api/posts/suggest-tags")
            .json(&serde_json::json!({ "content": content }));
        let response: SuggestedTagsResponse = self.send(request).await?;
        Ok(response.suggested_tags)
    }

    // ===== Comments =====

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        let request = self.request(Method::GET, &format!("/api/posts/{post_id}/comments"));
        let response: CommentsResponse = self.send(request).await?;
        Ok(response.comments)
    }

    pub async fn create_comment(&self, post_id: i64, content: &str) -> Result<Comment, ApiError> {
        let request = self
            .request(Method::POST, &format!("/api/posts/{post_id}/comments"))
            .json(&serde_json::json!({ "content": content }));
        let response: CommentResponse = self.send(request).await?;
        Ok(response.comment)
    }

    pub async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/api/comments/{id}")))
            .await
    }

    // ===== Users =====

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        let request = self.request(Method::GET, &format!("/api/users/{id}"));
        let response: UserResponse = self.send(request).await?;
        Ok(response.user)
    }

    /// Update a user profile. Editing the signed-in user's own profile also
    /// rewrites the stored identity so it survives a reload.
    pub async fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/api/users/{id}"))
            .json(update);
        let response: UserResponse = self.send(request).await?;

        if self.session.current_user().map(|u| u.id) == Some(id) {
            self.session.update_user(response.user.clone())?;
        }

        Ok(response.user)
    }

    pub async fn list_user_posts(&self, id: i64) -> Result<Vec<Post>, ApiError> {
        let request = self.request(Method::GET, &format!("/api/users/{id}/posts"));
        let response: PostsResponse = self.send(request).await?;
        Ok(response.posts)
    }
}

/// Sort an auth response body into either a `(token, user?)` pair or the
/// failure the server described. A body carrying `error`/`err`, or one
/// missing the token, never establishes a session.
fn extract_auth(text: &str) -> Result<(String, Option<User>), ApiError> {
    let auth: AuthResponse = serde_json::from_str(text)
        .map_err(|_| ApiError::Authentication(DEFAULT_AUTH_ERROR.to_string()))?;

    if let Some(message) = auth.error.message() {
        return Err(ApiError::Authentication(message.to_string()));
    }

    let token = auth
        .token
        .ok_or_else(|| ApiError::Authentication(DEFAULT_AUTH_ERROR.to_string()))?;

    Ok((token, auth.user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_tracks_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = Arc::new(SessionStore::open(dir.path().to_path_buf()));
        let config = Config {
            api_url: "http://127.0.0.1:5000".to_string(),
        };
        let api = ApiClient::new(&config, session.clone()).expect("Failed to build client");

        // Anonymous: no authorization header at all
        let request = api
            .request(Method::GET, "/api/posts")
            .build()
            .expect("build request");
        assert!(request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .is_none());

        // Authenticated: bearer credential attached verbatim
        session
            .login(
                User {
                    id: 1,
                    username: "alice".to_string(),
                    email: None,
                },
                "tok123".to_string(),
            )
            .expect("login");
        let request = api
            .request(Method::GET, "/api/posts")
            .build()
            .expect("build request");
        let auth = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .expect("authorization header");
        assert_eq!(auth.to_str().expect("ascii header"), "Bearer tok123");

        // Logout takes effect on the very next request
        session.logout().expect("logout");
        let request = api
            .request(Method::GET, "/api/posts")
            .build()
            .expect("build request");
        assert!(request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .is_none());
    }

    #[test]
    fn test_extract_auth_token_and_user() {
        let (token, user) =
            extract_auth(r#"{"token": "abc.def.ghi", "user": {"id": 1, "username": "alice"}}"#)
                .expect("Failed to extract auth");
        assert_eq!(token, "abc.def.ghi");
        assert_eq!(user.expect("user").username, "alice");
    }

    #[test]
    fn test_extract_auth_token_only() {
        let (token, user) =
            extract_auth(r#"{"token": "abc.def.ghi"}"#).expect("Failed to extract auth");
        assert_eq!(token, "abc.def.ghi");
        assert!(user.is_none());
    }

    #[test]
    fn test_extract_auth_error_field() {
        let err = extract_auth(r#"{"error": "username taken"}"#).expect_err("should fail");
        match err {
            ApiError::Authentication(message) => assert_eq!(message, "username taken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_auth_err_spelling() {
        let err = extract_auth(r#"{"err": "bad password"}"#).expect_err("should fail");
        match err {
            ApiError::Authentication(message) => assert_eq!(message, "bad password"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_auth_missing_token() {
        for body in [r#"{}"#, r#"{"user": {"id": 1, "username": "a"}}"#, "not json"] {
            let err = extract_auth(body).expect_err("should fail");
            match err {
                ApiError::Authentication(message) => {
                    assert_eq!(message, DEFAULT_AUTH_ERROR, "body: {body}")
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_error_field_wins_over_token() {
        // Some handlers send both; the error is authoritative and no
        // session may be established from such a response.
        let err =
            extract_auth(r#"{"token": "abc.def.ghi", "error": "expired"}"#).expect_err("fail");
        assert!(matches!(err, ApiError::Authentication(m) if m == "expired"));
    }
}
