//! Discord bot that lets students join, drop and list classes.
//!
//! Each class is a `student-<course>` role paired with a private
//! `classroom-<course>` channel, both looked up on the server by name.

pub mod domain;
pub mod application;
pub mod infrastructure;
