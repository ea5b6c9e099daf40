//! Middleware system for command gating

use std::sync::Arc;
use crate::domain::entities::{Command, CommandScope, Message};

/// Context passed through middleware chain
#[derive(Debug, Clone)]
pub struct Context {
    pub message: Message,
    pub command: Command,
    pub chat_id: String,
    pub channel_name: Option<String>,
    pub user_id: Option<String>,
}

impl Context {
    pub fn new(message: Message, command: Command) -> Self {
        let chat_id = message.chat_id.clone();
        let channel_name = message.channel_name.clone();
        let user_id = message.sender.as_ref().map(|u| u.id.clone());

        Self {
            message,
            command,
            chat_id,
            channel_name,
            user_id,
        }
    }
}

/// Middleware trait - processors that can stop a command before it runs
pub trait Middleware: Send + Sync {
    /// Process a message and optionally modify the context
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<Context, MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone)]
pub enum MiddlewareError {
    /// Stop processing silently
    Blocked(String),
    /// Caller lacks the permissions the command needs
    PermissionDenied(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::Blocked(msg) => write!(f, "Blocked: {}", msg),
            MiddlewareError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

/// Next middleware in chain
#[derive(Clone)]
pub struct Next {
    remaining: Arc<Vec<Arc<dyn Middleware>>>,
}

impl Next {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            remaining: Arc::new(middlewares),
        }
    }

    /// Process remaining middleware
    pub fn run(self, ctx: Context) -> MiddlewareResult {
        if let Some(first) = self.remaining.first() {
            let remaining = self.remaining[1..].to_vec();
            let next = Next::new(remaining);
            first.process(ctx, next)
        } else {
            // No more middleware, processing complete
            Ok(ctx)
        }
    }
}

/// Middleware chain builder
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Restricts class commands to the management channel
pub struct ChannelGateMiddleware {
    channel: String,
}

impl ChannelGateMiddleware {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl Middleware for ChannelGateMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.command.scope == CommandScope::ManageChannel
            && ctx.channel_name.as_deref() != Some(self.channel.as_str())
        {
            return Err(MiddlewareError::Blocked(format!(
                "{} outside #{}",
                ctx.command.name, self.channel
            )));
        }

        next.run(ctx)
    }
}

/// Requires manage permissions for privileged commands
pub struct PermissionGateMiddleware;

impl Middleware for PermissionGateMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.command.scope == CommandScope::Privileged {
            let allowed = ctx.message.sender
                .as_ref()
                .map(|u| u.permissions.can_manage_classes())
                .unwrap_or(false);

            if !allowed {
                return Err(MiddlewareError::PermissionDenied(format!(
                    "{} requires Manage Channels and Manage Roles",
                    ctx.command.name
                )));
            }
        }

        next.run(ctx)
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let user = ctx.user_id.clone().unwrap_or_else(|| "unknown".to_string());
        tracing::debug!(
            platform = %ctx.message.platform,
            guild = ctx.message.guild_id.as_deref().unwrap_or("-"),
            message = %ctx.message.id,
            "[{}] {} ran {}",
            ctx.chat_id, user, ctx.command.name
        );

        let chat_id = ctx.chat_id.clone();
        let message_id = ctx.message.id.clone();
        let result = next.run(ctx);

        if let Err(e) = &result {
            tracing::debug!(message = %message_id, "[{}] Stopped: {}", chat_id, e);
        }

        result
    }
}
