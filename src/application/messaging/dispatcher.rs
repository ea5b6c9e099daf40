//! Message dispatcher - Routes messages through the gates to the commands

use std::sync::Arc;
use crate::domain::entities::{Message, Content};
use crate::domain::traits::Guild;
use crate::application::services::{CommandOutcome, CommandService};
use super::parser::MessageParser;
use super::middleware::{
    ChannelGateMiddleware, Context, LoggingMiddleware, Middleware, MiddlewareError, Next,
    PermissionGateMiddleware,
};

/// Message dispatcher - routes messages through middleware to commands
pub struct MessageDispatcher {
    parser: MessageParser,
    middleware: Vec<Arc<dyn Middleware>>,
    commands: CommandService,
}

impl MessageDispatcher {
    /// A dispatcher with the classroom commands and no middleware
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let mut commands = CommandService::new(prefix.clone());
        commands.register_defaults();

        Self {
            parser: MessageParser::new(prefix),
            middleware: Vec::new(),
            commands,
        }
    }

    /// The standard setup: logging, the management channel gate and the
    /// permission gate for privileged commands
    pub fn for_classes(prefix: impl Into<String>, manage_channel: impl Into<String>) -> Self {
        Self::new(prefix)
            .with_middleware(LoggingMiddleware)
            .with_middleware(ChannelGateMiddleware::new(manage_channel))
            .with_middleware(PermissionGateMiddleware)
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    pub fn commands(&self) -> &CommandService {
        &self.commands
    }

    /// Process a message and return the replies to send, in order, along
    /// with any platform failure that stopped the command.
    ///
    /// Text, unknown commands and commands stopped by a gate yield no replies.
    pub async fn dispatch<G: Guild + ?Sized>(&self, message: Message, guild: &G) -> CommandOutcome {
        let Content::Command { name, args } = &message.content else {
            return CommandOutcome::default();
        };

        let Some(command) = self.commands.find(name) else {
            tracing::debug!("Unknown command: {}{}", self.parser.prefix(), name);
            return CommandOutcome::default();
        };

        let Some(sender) = message.sender.clone() else {
            tracing::debug!("Ignoring {} without a sender", command.name);
            return CommandOutcome::default();
        };

        let args = args.clone();
        let ctx = Context::new(message, command.clone());
        let next = Next::new(self.middleware.clone());

        match next.run(ctx) {
            Ok(ctx) => self.commands.execute(&ctx.command, &args, &sender, guild).await,
            Err(MiddlewareError::Blocked(_)) => CommandOutcome::default(),
            Err(MiddlewareError::PermissionDenied(msg)) => {
                tracing::warn!("{}: {}", sender.display_name(), msg);
                CommandOutcome::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::infrastructure::adapters::memory::MemoryGuild;

    fn message(dispatcher: &MessageDispatcher, channel: &str, text: &str) -> Message {
        dispatcher
            .parser()
            .parse("10", text, Some(User::new("1").with_username("ada")))
            .with_channel_name(channel)
    }

    #[tokio::test]
    async fn text_yields_nothing() {
        let dispatcher = MessageDispatcher::for_classes("!", "manage-classes");
        let guild = MemoryGuild::new();
        let outcome = dispatcher.dispatch(message(&dispatcher, "manage-classes", "hi"), &guild).await;
        assert!(outcome.replies.is_empty());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn without_middleware_nothing_is_gated() {
        let dispatcher = MessageDispatcher::new("!");
        let guild = MemoryGuild::new();
        let outcome = dispatcher.dispatch(message(&dispatcher, "general", "!listclass"), &guild).await;
        assert_eq!(outcome.replies, vec!["No classes are available!"]);
    }

    #[tokio::test]
    async fn gated_command_yields_nothing() {
        let dispatcher = MessageDispatcher::for_classes("!", "manage-classes");
        let guild = MemoryGuild::new();
        let outcome = dispatcher.dispatch(message(&dispatcher, "general", "!joinclass cs1010"), &guild).await;
        assert!(outcome.replies.is_empty());
        assert!(guild.mutations().await.is_empty());
    }
}
