//! The caller as seen by the permission layer

use serde::{Deserialize, Serialize};

use crate::role::{GroupLabels, Role, RoleSet};

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Legacy group names, used as a fallback role signal
    #[serde(default)]
    pub groups: Vec<String>,
}

impl User {
    /// Roles held through the explicit role or any recognised group
    pub fn roles(&self, labels: &GroupLabels) -> RoleSet {
        RoleSet::resolve(self.role, self.groups.as_slice(), labels)
    }

    /// "First Last", or the username when both names are blank
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Either nobody or a known account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl Principal {
    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user().map(|u| u.id)
    }

    /// Resolved roles; empty for anonymous callers
    pub fn roles(&self, labels: &GroupLabels) -> RoleSet {
        self.user().map(|u| u.roles(labels)).unwrap_or_default()
    }
}

impl From<Option<User>> for Principal {
    fn from(user: Option<User>) -> Self {
        user.map(Principal::Authenticated).unwrap_or_default()
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Principal::Authenticated(user)
    }
}
