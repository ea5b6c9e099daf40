//! Application services - Classroom logic orchestration

pub mod class_service;
pub mod command_service;

pub use class_service::ClassService;
pub use command_service::{CommandOutcome, CommandService};
