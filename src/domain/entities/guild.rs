/// A server role as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleInfo {
    pub id: String,
    pub name: String,
}

impl RoleInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A server text channel as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
}

impl ChannelInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Server-wide permissions of the member who sent a command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MemberPermissions {
    pub manage_channels: bool,
    pub manage_roles: bool,
}

impl MemberPermissions {
    pub fn all() -> Self {
        Self {
            manage_channels: true,
            manage_roles: true,
        }
    }

    /// Purging a class deletes both a role and a channel
    pub fn can_manage_classes(&self) -> bool {
        self.manage_channels && self.manage_roles
    }
}
