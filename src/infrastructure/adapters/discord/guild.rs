//! Discord server access through serenity's HTTP client

use async_trait::async_trait;
use serenity::all::{
    ChannelId, ChannelType, CreateChannel, EditRole, GuildId, Http, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::services::class_service::CREATE_ROLE_REASON;
use crate::domain::entities::{ChannelInfo, MemberPermissions, RoleInfo, User};
use crate::domain::traits::Guild;

/// What a student role may do in its classroom
pub fn student_access() -> Permissions {
    Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::SEND_TTS_MESSAGES
        | Permissions::READ_MESSAGE_HISTORY
        | Permissions::ATTACH_FILES
        | Permissions::MANAGE_MESSAGES
        | Permissions::EMBED_LINKS
}

/// Parse a snowflake id; Discord ids are never zero
fn parse_id(id: &str) -> Result<u64, BotError> {
    match id.parse::<u64>() {
        Ok(0) | Err(_) => Err(BotError::Parse(format!("invalid Discord id: {:?}", id))),
        Ok(id) => Ok(id),
    }
}

/// One Discord server, addressed over HTTP
#[derive(Clone)]
pub struct DiscordGuild {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordGuild {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }

    fn http(&self) -> &Http {
        &self.http
    }

    /// `@everyone` shares its id with the guild
    fn everyone(&self) -> RoleId {
        RoleId::new(self.guild_id.get())
    }

    /// Permissions of a member in a channel. The owner and administrators
    /// hold everything; otherwise `@everyone` plus each held role, then the
    /// channel's overwrites.
    pub async fn member_permissions_in(
        &self,
        user_id: UserId,
        overwrites: &[PermissionOverwrite],
    ) -> Result<MemberPermissions, BotError> {
        let guild = self.guild_id.to_partial_guild(self.http()).await?;
        if guild.owner_id == user_id {
            return Ok(MemberPermissions::all());
        }

        let member = self.guild_id.member(self.http(), user_id).await?;
        let mut base = guild.roles
            .get(&self.everyone())
            .map(|r| r.permissions)
            .unwrap_or_else(Permissions::empty);
        for role_id in &member.roles {
            if let Some(role) = guild.roles.get(role_id) {
                base |= role.permissions;
            }
        }

        let permissions = channel_permissions(base, self.everyone(), &member.roles, user_id, overwrites);
        Ok(MemberPermissions {
            manage_channels: permissions.contains(Permissions::MANAGE_CHANNELS),
            manage_roles: permissions.contains(Permissions::MANAGE_ROLES),
        })
    }
}

/// Apply a channel's overwrites to a member's server permissions, in
/// Discord's order: `@everyone`, then the member's roles together, then the
/// member. Administrators ignore overwrites.
pub(crate) fn channel_permissions(
    base: Permissions,
    everyone: RoleId,
    roles: &[RoleId],
    user_id: UserId,
    overwrites: &[PermissionOverwrite],
) -> Permissions {
    if base.contains(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    let mut permissions = base;
    for overwrite in overwrites {
        if matches!(overwrite.kind, PermissionOverwriteType::Role(id) if id == everyone) {
            permissions &= !overwrite.deny;
            permissions |= overwrite.allow;
        }
    }

    let (mut allow, mut deny) = (Permissions::empty(), Permissions::empty());
    for overwrite in overwrites {
        if matches!(overwrite.kind, PermissionOverwriteType::Role(id) if id != everyone && roles.contains(&id)) {
            allow |= overwrite.allow;
            deny |= overwrite.deny;
        }
    }
    permissions &= !deny;
    permissions |= allow;

    for overwrite in overwrites {
        if matches!(overwrite.kind, PermissionOverwriteType::Member(id) if id == user_id) {
            permissions &= !overwrite.deny;
            permissions |= overwrite.allow;
        }
    }

    permissions
}

#[async_trait]
impl Guild for DiscordGuild {
    async fn roles(&self) -> Result<Vec<RoleInfo>, BotError> {
        let mut roles: Vec<_> = self.guild_id.roles(self.http()).await?.into_values().collect();
        roles.sort_by_key(|r| r.position);
        Ok(roles
            .into_iter()
            .map(|r| RoleInfo::new(r.id.to_string(), r.name))
            .collect())
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, BotError> {
        let mut channels: Vec<_> = self.guild_id
            .channels(self.http())
            .await?
            .into_values()
            .filter(|c| c.kind == ChannelType::Text)
            .collect();
        channels.sort_by_key(|c| c.position);
        Ok(channels
            .into_iter()
            .map(|c| ChannelInfo::new(c.id.to_string(), c.name))
            .collect())
    }

    async fn member_roles(&self, user: &User) -> Result<Vec<RoleInfo>, BotError> {
        let user_id = UserId::new(parse_id(&user.id)?);
        let member = self.guild_id.member(self.http(), user_id).await?;
        let roles = self.roles().await?;
        Ok(roles
            .into_iter()
            .filter(|r| member.roles.iter().any(|id| id.to_string() == r.id))
            .collect())
    }

    async fn create_role(&self, name: &str) -> Result<RoleInfo, BotError> {
        let builder = EditRole::new()
            .name(name)
            .permissions(Permissions::empty())
            .audit_log_reason(CREATE_ROLE_REASON);
        let role = self.guild_id.create_role(self.http(), builder).await?;
        tracing::info!("Created role {} ({})", role.name, role.id);
        Ok(RoleInfo::new(role.id.to_string(), role.name))
    }

    async fn create_private_channel(&self, name: &str) -> Result<ChannelInfo, BotError> {
        let hidden = PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(self.everyone()),
        };
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .permissions(vec![hidden]);
        let channel = self.guild_id.create_channel(self.http(), builder).await?;
        tracing::info!("Created channel #{} ({})", channel.name, channel.id);
        Ok(ChannelInfo::new(channel.id.to_string(), channel.name))
    }

    async fn grant_channel_access(&self, channel: &ChannelInfo, role: &RoleInfo) -> Result<(), BotError> {
        let overwrite = PermissionOverwrite {
            allow: student_access(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(RoleId::new(parse_id(&role.id)?)),
        };
        ChannelId::new(parse_id(&channel.id)?)
            .create_permission(self.http(), overwrite)
            .await?;
        Ok(())
    }

    async fn add_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError> {
        self.http
            .add_member_role(
                self.guild_id,
                UserId::new(parse_id(&user.id)?),
                RoleId::new(parse_id(&role.id)?),
                Some(reason),
            )
            .await?;
        Ok(())
    }

    async fn remove_member_role(&self, user: &User, role: &RoleInfo, reason: &str) -> Result<(), BotError> {
        self.http
            .remove_member_role(
                self.guild_id,
                UserId::new(parse_id(&user.id)?),
                RoleId::new(parse_id(&role.id)?),
                Some(reason),
            )
            .await?;
        Ok(())
    }

    async fn delete_role(&self, role: &RoleInfo) -> Result<(), BotError> {
        self.guild_id
            .delete_role(self.http(), RoleId::new(parse_id(&role.id)?))
            .await?;
        tracing::info!("Deleted role {} ({})", role.name, role.id);
        Ok(())
    }

    async fn delete_channel(&self, channel: &ChannelInfo) -> Result<(), BotError> {
        ChannelId::new(parse_id(&channel.id)?)
            .delete(self.http())
            .await?;
        tracing::info!("Deleted channel #{} ({})", channel.name, channel.id);
        Ok(())
    }
}
