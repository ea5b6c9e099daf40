use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{ChannelInfo, RoleInfo, User};

/// Guild trait - the server a command was sent in.
///
/// Every call goes straight to the platform; implementations keep no state
/// of their own beyond what the platform client already caches.
#[async_trait]
pub trait Guild: Send + Sync {
    /// All roles on the server
    async fn roles(&self) -> Result<Vec<RoleInfo>, BotError>;

    /// All channels on the server
    async fn channels(&self) -> Result<Vec<ChannelInfo>, BotError>;

    /// Roles currently held by a member
    async fn member_roles(&self, user: &User) -> Result<Vec<RoleInfo>, BotError>;

    /// Create a role with no permissions of its own
    async fn create_role(&self, name: &str) -> Result<RoleInfo, BotError>;

    /// Create a text channel hidden from `@everyone`
    async fn create_private_channel(&self, name: &str) -> Result<ChannelInfo, BotError>;

    /// Let a role read, write and manage messages in a channel
    async fn grant_channel_access(&self, channel: &ChannelInfo, role: &RoleInfo) -> Result<(), BotError>;

    async fn add_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError>;

    async fn remove_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError>;

    async fn delete_role(&self, role: &RoleInfo) -> Result<(), BotError>;

    async fn delete_channel(&self, channel: &ChannelInfo) -> Result<(), BotError>;

    /// Look up a role by exact name
    async fn find_role(&self, name: &str) -> Result<Option<RoleInfo>, BotError> {
        Ok(self.roles().await?.into_iter().find(|r| r.name == name))
    }

    /// Look up a channel by exact name
    async fn find_channel(&self, name: &str) -> Result<Option<ChannelInfo>, BotError> {
        Ok(self.channels().await?.into_iter().find(|c| c.name == name))
    }
}
