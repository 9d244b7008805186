use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::auth::Role;

/// A user account as returned by the `/users` endpoints. The password hash
/// is never included in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl UserAccount {
    pub fn status_display(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }
}

/// Body for `PATCH /users/{id}`. Only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_from_api_json() {
        let json = r#"{
            "id": "64f0a1b2c3d4e5f6a7b8c9d0",
            "username": "frontdesk1",
            "email": "desk@example.com",
            "name": "Front Desk One",
            "phone": "9876543210",
            "role": "front-desk",
            "is_active": true
        }"#;

        let user: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "frontdesk1");
        assert_eq!(user.role, Role::FrontDesk);
        assert_eq!(user.status_display(), "Active");
    }

    #[test]
    fn update_body_skips_unset_fields() {
        let update = UserUpdate {
            password: Some("new-secret".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_string(&update).unwrap();
        assert_eq!(body, r#"{"password":"new-secret"}"#);
    }
}
