use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Guest,
    User,
    Admin,
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(UserRole::Guest),
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown user role '{}'", other)),
        }
    }
}

/// Public profile of a platform user, returned by creator recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub total_prompts: i32,
    pub total_followers: i32,
    pub created_at: DateTime<Utc>,
}

/// Identity of the caller, resolved by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_authenticated_user_from_profile() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            display_name: None,
            avatar_url: None,
            bio: None,
            role: UserRole::Admin,
            is_active: true,
            total_prompts: 3,
            total_followers: 12,
            created_at: Utc::now(),
        };

        let identity = AuthenticatedUser::from(&user);
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, UserRole::Admin);
    }
}
