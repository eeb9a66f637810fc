use serde::{Deserialize, Serialize};

/// Credentials row. Authorization lives in `Profile`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Same id as the owning `User`.
    pub id: i64,
    pub role: String, // admin, user
    pub full_name: Option<String>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn display_name<'a>(&'a self, user: &'a User) -> &'a str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&user.email)
    }
}
