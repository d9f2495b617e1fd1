//! Durable storage of users, projects and chat messages.
//!
//! The rest of the crate only talks to storage through the
//! [`EntityStore`] trait. The composing application decides which
//! implementation to construct and owns its lifecycle.
use futures::future::BoxFuture;
use thiserror::Error;

use crate::schema::{ChatMessage, Project, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Could not read from the entity store")]
    Read,
    #[error("Could not write to the entity store")]
    Write,
    #[error("Entity store is currently in read-only mode")]
    Readonly,
    #[error("Record already exists")]
    Duplicate,
}

pub type Result<T> = error_stack::Result<T, StoreError>;

/// Storage boundary of the application.
///
/// Every write stores exactly one record and is atomic: readers
/// either see the previous record or the new one, never a mix.
/// Lists are returned in insertion order.
pub trait EntityStore: std::fmt::Debug + Send + Sync {
    fn get_user<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<User>>>;

    /// Looks up a user by email, ignoring ASCII case.
    fn find_user_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>>>;

    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>>>;

    /// Fails with [`StoreError::Duplicate`] if the id or the
    /// email (ignoring case) is already taken.
    fn insert_user(&self, user: User) -> BoxFuture<'_, Result<()>>;

    fn get_project<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Project>>>;

    /// Inserts the project or replaces the existing one with the same id.
    fn put_project(&self, project: Project) -> BoxFuture<'_, Result<()>>;

    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>>;

    /// Lists messages of one project, or of every project if `None`.
    fn list_messages<'a>(
        &'a self,
        project_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>>>;

    /// Fails with [`StoreError::Duplicate`] if the id is already taken.
    fn put_message(&self, message: ChatMessage) -> BoxFuture<'_, Result<()>>;
}
