//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod guild;

pub use bot::Bot;
pub use guild::Guild;
