//! Domain entities - Core objects with no platform dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod course;
pub mod guild;

pub use user::User;
pub use message::{Message, Content};
pub use command::{Command, CommandKind, CommandRegistry, CommandScope};
pub use course::{Course, course_from_role_name};
pub use guild::{ChannelInfo, MemberPermissions, RoleInfo};
