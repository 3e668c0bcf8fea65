use std::fmt;

use axum_login::AuthUser;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::models::{AreaRef, ProfileId};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    /// Signed in but not yet approved by an admin.
    #[default]
    Pending,
    Member,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_approved(&self) -> bool {
        !matches!(self, Role::Pending)
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        role.parse().unwrap_or_default()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip)]
    pub access_token: String,
}

impl Profile {
    pub fn actor(&self) -> Actor {
        Actor {
            profile_id: self.id,
            role: self.role,
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

impl AuthUser for Profile {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id.as_i32().into()
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.access_token.as_bytes()
    }
}

/// A profile together with the areas it is linked to, for the admin user list.
#[derive(Debug, Clone)]
pub struct ProfileWithAreas {
    pub profile: Profile,
    pub primary_area: Option<AreaRef>,
    pub areas: Vec<AreaRef>,
}

/// Who is calling a domain service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub profile_id: ProfileId,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
