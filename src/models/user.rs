use serde::{Deserialize, Serialize};

/// A signed-in user's identity, as carried in the token payload claims and
/// persisted under the `user_data` storage key.
///
/// `email` is absent when the identity was extracted from a token payload,
/// which only carries `id` and `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for `POST /auth/sign-in`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body for `POST /auth/sign-up`
#[derive(Debug, Clone, Serialize)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body for `PUT /api/users/:id`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_response() {
        let json = r#"{"user": {"id": 3, "username": "miyuki", "email": "m@example.com"}}"#;
        let resp: UserResponse = serde_json::from_str(json).expect("Failed to parse user response");
        assert_eq!(resp.user.id, 3);
        assert_eq!(resp.user.username, "miyuki");
        assert_eq!(resp.user.email.as_deref(), Some("m@example.com"));
    }

    #[test]
    fn test_user_without_email() {
        // Token-derived identities carry no email
        let user: User = serde_json::from_str(r#"{"id": 7, "username": "alice"}"#)
            .expect("Failed to parse user");
        assert_eq!(user.email, None);

        // And the absent field stays out of the serialized form
        let json = serde_json::to_string(&user).expect("Failed to serialize user");
        assert!(!json.contains("email"));
    }
}
