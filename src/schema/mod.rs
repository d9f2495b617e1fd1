//! Records stored by the [entity store](crate::store::EntityStore)
//! and exposed through the HTTP API.
mod message;
mod project;
mod user;

pub use message::{ChatMessage, MessageKind};
pub use project::{Checkpoint, CheckpointStatus, Project, Task, TaskStatus};
pub use user::{InvalidUserRole, User, UserRole};
