use async_trait::async_trait;
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and listen for messages until the platform closes
    async fn start(&self) -> Result<(), BotError>;
}
