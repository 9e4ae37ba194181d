//! Wire types for the auth API. Shapes mirror the backend's user schema; the
//! serialized user is also what lands in the advisory credential cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role assigned to every account. The backend accepts exactly these three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Contributor,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Contributor => "Contributor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// User record returned by `/auth/me`, registration, and profile updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Token payload returned by login and refresh.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Partial profile update; unset fields are left untouched by the server.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_backend_payload() {
        let payload = r#"{
            "id": "3f2e9c1a-9f4b-4d2c-8a6e-1b2c3d4e5f60",
            "email": "ada@mentis.dev",
            "name": "Ada",
            "role": "Manager",
            "is_active": true,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        }"#;

        let user: User = serde_json::from_str(payload).expect("deserialize user");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.role, Role::Manager);
        assert!(user.is_active);
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Ada Lovelace".to_string()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_string(&update).expect("serialize update");
        assert_eq!(json, r#"{"name":"Ada Lovelace"}"#);
    }

    #[test]
    fn role_round_trips_as_backend_string() {
        assert_eq!(serde_json::to_string(&Role::Admin).expect("serialize"), r#""Admin""#);
        let role: Role = serde_json::from_str(r#""Contributor""#).expect("deserialize");
        assert_eq!(role, Role::Contributor);
        assert_eq!(role.to_string(), "Contributor");
    }
}
