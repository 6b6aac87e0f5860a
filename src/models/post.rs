use serde::{Deserialize, Serialize};

/// A blog post as returned by the API.
///
/// `tags` is a comma-separated string on the wire; use [`Post::tag_list`]
/// for the split form. Timestamps are kept as the server's string
/// representation since the client only displays them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    pub author: String,
    pub user_id: i64,
    pub created_at: String,
}

impl Post {
    /// Tags split out of the comma-separated wire form, trimmed, empties dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Body for `POST /api/posts`
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

/// Query parameters for `GET /api/posts`.
///
/// Unset filters are omitted from the query string entirely rather than
/// sent empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub user_id: i64,
    pub created_at: String,
}

/// A post together with its comments and like count, fetched concurrently.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub like_count: u64,
}

// Wire envelopes

#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub post: Post,
}

#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

#[derive(Debug, Deserialize)]
pub struct LikesResponse {
    pub like_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct SuggestedTagsResponse {
    pub suggested_tags: Vec<String>,
}
