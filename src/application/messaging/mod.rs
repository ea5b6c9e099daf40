//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use middleware::{ChannelGateMiddleware, LoggingMiddleware, Middleware, MiddlewareChain, PermissionGateMiddleware};
pub use parser::MessageParser;
