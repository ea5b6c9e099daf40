//! Discord adapter

mod guild;

pub use guild::{student_access, DiscordGuild};

use async_trait::async_trait;
use serenity::all::{
    Client, Context, EventHandler, GatewayIntents, Message as DiscordMessage, Ready,
};
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::messaging::MessageDispatcher;
use crate::domain::entities::{CommandScope, Content, MemberPermissions, Message, User};
use crate::domain::traits::Bot;

/// Longest message Discord accepts
pub const MAX_MESSAGE_LEN: usize = 2000;

impl From<serenity::Error> for BotError {
    fn from(e: serenity::Error) -> Self {
        if let serenity::Error::Http(http_err) = &e {
            return match http_err.status_code().map(|s| s.as_u16()) {
                Some(401) => BotError::Auth(e.to_string()),
                Some(403) => BotError::PermissionDenied(e.to_string()),
                Some(404) => BotError::NotFound(e.to_string()),
                _ => BotError::Network(e.to_string()),
            };
        }
        BotError::Platform(e.to_string())
    }
}

/// Split a reply on line boundaries so each part fits in one message
pub fn chunk_reply(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line;
        // A single line longer than the limit is hard-wrapped.
        while line.chars().count() > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let split = line.char_indices().nth(limit).map(|(i, _)| i).unwrap_or(line.len());
            chunks.push(line[..split].to_string());
            line = &line[split..];
        }

        let needed = if current.is_empty() { 0 } else { 1 } + line.chars().count();
        if current.chars().count() + needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Serenity event handler feeding guild messages to the dispatcher
struct Handler {
    dispatcher: Arc<MessageDispatcher>,
}

impl Handler {
    /// Build the domain message, resolving only what the command needs:
    /// the channel name for gated commands, permissions in the channel for
    /// privileged ones.
    async fn build_message(
        &self,
        ctx: &Context,
        msg: &DiscordMessage,
        guild: &DiscordGuild,
        content: Content,
        scope: CommandScope,
    ) -> Result<Message, BotError> {
        let channel = match scope {
            CommandScope::Anywhere => None,
            _ => msg.channel_id.to_channel(ctx).await?.guild(),
        };

        let permissions = match (&channel, scope) {
            (Some(channel), CommandScope::Privileged) => {
                guild.member_permissions_in(msg.author.id, &channel.permission_overwrites).await?
            }
            _ => MemberPermissions::default(),
        };

        let user = User::new(msg.author.id.to_string())
            .with_username(msg.author.name.clone())
            .with_nickname(msg.author.global_name.clone())
            .with_permissions(permissions);

        let mut message = Message::new(msg.channel_id.to_string(), content)
            .with_id(msg.id.to_string())
            .with_sender(user)
            .with_platform("discord");
        if let Some(guild_id) = msg.guild_id {
            message = message.with_guild(guild_id.to_string());
        }
        if let Some(channel) = channel {
            message = message.with_channel_name(channel.name);
        }

        Ok(message)
    }

    async fn send_replies(&self, ctx: &Context, msg: &DiscordMessage, replies: Vec<String>) {
        for reply in replies {
            for chunk in chunk_reply(&reply, MAX_MESSAGE_LEN) {
                if let Err(e) = msg.reply(ctx, chunk).await {
                    match BotError::from(e) {
                        BotError::PermissionDenied(e) => {
                            tracing::error!("error: incorrect permissions. {}", e);
                        }
                        BotError::Network(e) => {
                            tracing::error!("error: unable to make connection to server. {}", e);
                        }
                        e => tracing::error!("error: {}", e),
                    }
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }
        // Classes only exist on servers.
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let content = self.dispatcher.parser().parse_content(&msg.content);
        let Content::Command { name, .. } = &content else {
            return;
        };
        let Some(scope) = self.dispatcher.commands().find(name).map(|c| c.scope) else {
            tracing::debug!("Unknown command: {}", name);
            return;
        };

        let guild = DiscordGuild::new(ctx.http.clone(), guild_id);
        let message = match self.build_message(&ctx, &msg, &guild, content, scope).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to read message context: {}", e);
                return;
            }
        };

        // Courses applied before a failure still get their confirmation.
        let outcome = self.dispatcher.dispatch(message, &guild).await;
        self.send_replies(&ctx, &msg, outcome.replies).await;
        if let Some(e) = outcome.error {
            tracing::error!("Command failed in guild {}: {}", guild_id, e);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("Connected as {} to {} guild(s)", ready.user.name, ready.guilds.len());
    }
}

/// Discord bot adapter
pub struct DiscordAdapter {
    token: String,
    name: String,
    dispatcher: Arc<MessageDispatcher>,
}

impl DiscordAdapter {
    pub fn new(token: impl Into<String>, name: impl Into<String>, dispatcher: MessageDispatcher) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl Bot for DiscordAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting Discord bot {}", self.name);

        let handler = Handler {
            dispatcher: self.dispatcher.clone(),
        };
        let mut client = Client::builder(&self.token, Self::intents())
            .event_handler(handler)
            .await?;

        client.start().await?;
        Ok(())
    }
}
