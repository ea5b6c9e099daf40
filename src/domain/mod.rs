//! Domain layer - Core classroom logic with no platform dependencies
//! 
//! This layer contains:
//! - Entities: Core objects (Course, User, Message, Command, guild objects)
//! - Traits: Abstractions for infrastructure (Bot, Guild)

pub mod entities;
pub mod traits;
