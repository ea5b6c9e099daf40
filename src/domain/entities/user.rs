use std::fmt;

use super::MemberPermissions;

/// Represents a server member in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub permissions: MemberPermissions,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            nickname: None,
            permissions: MemberPermissions::default(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_nickname(mut self, nickname: Option<impl Into<String>>) -> Self {
        self.nickname = nickname.map(|n| n.into());
        self
    }

    pub fn with_permissions(mut self, permissions: MemberPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Name used in replies: the account name, falling back to the id
    pub fn display_name(&self) -> String {
        if let Some(ref username) = self.username {
            username.clone()
        } else if let Some(ref nickname) = self.nickname {
            nickname.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
