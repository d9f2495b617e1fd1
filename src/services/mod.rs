//! Business rules sitting between the HTTP layer and the entity store.
//!
//! Each service borrows the [`EntityStore`] it was constructed with
//! and holds no other state.
//!
//! [`EntityStore`]: crate::store::EntityStore
mod error;
mod messages;
mod projects;
mod users;

pub use error::{Result, ServiceError, StoreResultExt};
pub use messages::Messages;
pub use projects::{ProjectFilter, Projects};
pub use users::Users;
