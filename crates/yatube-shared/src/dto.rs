//! Data Transfer Objects - bodies of the urlencoded forms and query strings.

use serde::{Deserialize, Serialize};

/// `?page=` of every paginated feed. Kept raw so junk values can fall back
/// to the first page instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `?next=` carried through the login redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Signup form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Comment form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let form: LoginForm = serde_json::from_str("{}").unwrap();
        assert!(form.username.is_empty());
        assert!(form.next.is_none());

        let comment: CommentFormData = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(comment.text, "hi");
    }
}
