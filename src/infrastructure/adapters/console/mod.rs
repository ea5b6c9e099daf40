//! Console adapter for development/testing

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::BotError;
use crate::application::messaging::MessageDispatcher;
use crate::application::services::CommandOutcome;
use crate::domain::entities::{MemberPermissions, User};
use crate::domain::traits::{Bot, Guild};
use crate::infrastructure::adapters::memory::MemoryGuild;

/// Channels every simulated server starts with
const DEFAULT_CHANNELS: &[&str] = &["general"];

/// Console bot adapter for local development.
///
/// Simulates one server in memory with a single member typing at the
/// prompt. A line starting with `#` moves that member to another channel.
pub struct ConsoleAdapter {
    dispatcher: MessageDispatcher,
    guild: MemoryGuild,
    user: User,
    manage_channel: String,
}

impl ConsoleAdapter {
    pub fn new(dispatcher: MessageDispatcher, user: impl Into<String>, manage_channel: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            dispatcher,
            guild: MemoryGuild::new(),
            user: User::new("console-user")
                .with_username(user)
                .with_permissions(MemberPermissions::all()),
            manage_channel: manage_channel.into(),
        }
    }

    pub fn guild(&self) -> &MemoryGuild {
        &self.guild
    }

    /// Handle one line typed at the prompt, returning what the bot says
    pub async fn handle_line(&self, channel: &mut String, line: &str) -> CommandOutcome {
        let line = line.trim();
        if line.is_empty() {
            return CommandOutcome::default();
        }

        if let Some(name) = line.strip_prefix('#') {
            let name = name.trim();
            if name.is_empty() {
                return CommandOutcome::default();
            }
            match self.guild.find_channel(name).await {
                Ok(Some(_)) => {}
                Ok(None) => { self.guild.seed_channel(name).await; }
                Err(e) => return CommandOutcome::failed(e),
            }
            *channel = name.to_string();
            return CommandOutcome::replies(vec![format!("(now in #{})", channel)]);
        }

        let message = self.dispatcher
            .parser()
            .parse(channel.clone(), line, Some(self.user.clone()))
            .with_channel_name(channel.clone())
            .with_guild("console")
            .with_platform("console");

        self.dispatcher.dispatch(message, &self.guild).await
    }

    async fn seed(&self) {
        for name in DEFAULT_CHANNELS.iter().copied().chain(std::iter::once(self.manage_channel.as_str())) {
            self.guild.seed_channel(name).await;
        }
    }

    fn say(text: &str) {
        println!("[BOT] {}", text);
    }

    fn prompt(channel: &str) {
        print!("#{}> ", channel);
        let _ = std::io::stdout().flush();
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        self.seed().await;

        let mut channel = self.manage_channel.clone();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        Self::prompt(&channel);
        while let Some(line) = lines.next_line().await.map_err(|e| BotError::Internal(e.to_string()))? {
            let outcome = self.handle_line(&mut channel, &line).await;
            for reply in &outcome.replies {
                Self::say(reply);
            }
            if let Some(e) = outcome.error {
                tracing::error!("Command failed: {}", e);
            }
            Self::prompt(&channel);
        }

        tracing::info!("Console closed");
        Ok(())
    }
}
