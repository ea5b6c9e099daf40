//! In-memory guild for console mode and tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::application::errors::BotError;
use crate::domain::entities::{ChannelInfo, RoleInfo, User};
use crate::domain::traits::Guild;

/// A platform call that changed the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateRole(String),
    CreateChannel(String),
    GrantAccess { channel: String, role: String },
    AddRole { user: String, role: String },
    RemoveRole { user: String, role: String },
    DeleteRole(String),
    DeleteChannel(String),
}

#[derive(Debug, Default)]
struct GuildState {
    roles: Vec<RoleInfo>,
    channels: Vec<ChannelInfo>,
    /// Private channels and the roles allowed into them
    access: HashMap<String, HashSet<String>>,
    members: HashMap<String, HashSet<String>>,
    log: Vec<Mutation>,
}

/// A server held entirely in memory
#[derive(Clone, Default)]
pub struct MemoryGuild {
    state: Arc<RwLock<GuildState>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryGuild {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    /// Add a text channel without logging a mutation
    pub async fn seed_channel(&self, name: &str) -> ChannelInfo {
        let channel = ChannelInfo::new(self.next_id(), name);
        self.state.write().await.channels.push(channel.clone());
        channel
    }

    /// Add a role without logging a mutation
    pub async fn seed_role(&self, name: &str) -> RoleInfo {
        let role = RoleInfo::new(self.next_id(), name);
        self.state.write().await.roles.push(role.clone());
        role
    }

    /// Every change made through the `Guild` trait, oldest first
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.state.read().await.log.clone()
    }

    /// Roles allowed into a channel
    pub async fn channel_access(&self, channel: &ChannelInfo) -> Vec<String> {
        let state = self.state.read().await;
        let mut roles: Vec<String> = state.access
            .get(&channel.id)
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default();
        roles.sort();
        roles
    }
}

#[async_trait]
impl Guild for MemoryGuild {
    async fn roles(&self) -> Result<Vec<RoleInfo>, BotError> {
        Ok(self.state.read().await.roles.clone())
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, BotError> {
        Ok(self.state.read().await.channels.clone())
    }

    async fn member_roles(&self, user: &User) -> Result<Vec<RoleInfo>, BotError> {
        let state = self.state.read().await;
        let Some(held) = state.members.get(&user.id) else {
            return Ok(Vec::new());
        };
        Ok(state.roles.iter().filter(|r| held.contains(&r.id)).cloned().collect())
    }

    async fn create_role(&self, name: &str) -> Result<RoleInfo, BotError> {
        let role = RoleInfo::new(self.next_id(), name);
        let mut state = self.state.write().await;
        state.roles.push(role.clone());
        state.log.push(Mutation::CreateRole(name.to_string()));
        Ok(role)
    }

    async fn create_private_channel(&self, name: &str) -> Result<ChannelInfo, BotError> {
        let channel = ChannelInfo::new(self.next_id(), name);
        let mut state = self.state.write().await;
        state.channels.push(channel.clone());
        state.access.insert(channel.id.clone(), HashSet::new());
        state.log.push(Mutation::CreateChannel(name.to_string()));
        Ok(channel)
    }

    async fn grant_channel_access(&self, channel: &ChannelInfo, role: &RoleInfo) -> Result<(), BotError> {
        let mut state = self.state.write().await;
        if !state.channels.iter().any(|c| c.id == channel.id) {
            return Err(BotError::NotFound(format!("channel {}", channel.name)));
        }
        state.access.entry(channel.id.clone()).or_default().insert(role.name.clone());
        state.log.push(Mutation::GrantAccess {
            channel: channel.name.clone(),
            role: role.name.clone(),
        });
        Ok(())
    }

    async fn add_member_role(&self, user: &User, role: &RoleInfo, _reason: &str) -> Result<(), BotError> {
        let mut state = self.state.write().await;
        if !state.roles.iter().any(|r| r.id == role.id) {
            return Err(BotError::NotFound(format!("role {}", role.name)));
        }
        state.members.entry(user.id.clone()).or_default().insert(role.id.clone());
        state.log.push(Mutation::AddRole {
            user: user.id.clone(),
            role: role.name.clone(),
        });
        Ok(())
    }

    async fn remove_member_role(&self, user: &User, role: &RoleInfo, _reason: &str) -> Result<(), BotError> {
        let mut state = self.state.write().await;
        if let Some(held) = state.members.get_mut(&user.id) {
            held.remove(&role.id);
        }
        state.log.push(Mutation::RemoveRole {
            user: user.id.clone(),
            role: role.name.clone(),
        });
        Ok(())
    }

    async fn delete_role(&self, role: &RoleInfo) -> Result<(), BotError> {
        let mut state = self.state.write().await;
        state.roles.retain(|r| r.id != role.id);
        for held in state.members.values_mut() {
            held.remove(&role.id);
        }
        for allowed in state.access.values_mut() {
            allowed.remove(&role.name);
        }
        state.log.push(Mutation::DeleteRole(role.name.clone()));
        Ok(())
    }

    async fn delete_channel(&self, channel: &ChannelInfo) -> Result<(), BotError> {
        let mut state = self.state.write().await;
        state.channels.retain(|c| c.id != channel.id);
        state.access.remove(&channel.id);
        state.log.push(Mutation::DeleteChannel(channel.name.clone()));
        Ok(())
    }
}
