use error_stack::Report;
use futures::future::{self, BoxFuture, FutureExt};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{EntityStore, Result, StoreError};
use crate::schema::{ChatMessage, Project, User};

/// Process-local [`EntityStore`].
///
/// Records are lost when the process exits. Locks are only held
/// for a single operation and never across an `.await`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Records>,
}

#[derive(Debug, Default)]
struct Records {
    users: Vec<User>,
    projects: Vec<Project>,
    messages: Vec<ChatMessage>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.inner.read().map_err(|_| {
            Report::new(StoreError::Read).attach_printable("memory store lock is poisoned")
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.inner.write().map_err(|_| {
            Report::new(StoreError::Write).attach_printable("memory store lock is poisoned")
        })
    }
}

impl EntityStore for MemoryStore {
    #[tracing::instrument(skip(self), name = "store.memory.get_user")]
    fn get_user<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<User>>> {
        let result = self
            .read()
            .map(|records| records.users.iter().find(|u| u.id == id).cloned());
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip_all, name = "store.memory.find_user_by_email")]
    fn find_user_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>>> {
        let result = self.read().map(|records| {
            records
                .users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        });
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip(self), name = "store.memory.list_users")]
    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>>> {
        let result = self.read().map(|records| records.users.clone());
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip_all, fields(user.id = %user.id), name = "store.memory.insert_user")]
    fn insert_user(&self, user: User) -> BoxFuture<'_, Result<()>> {
        let result = self.write().and_then(|mut records| {
            let taken = records
                .users
                .iter()
                .any(|u| u.id == user.id || u.email.eq_ignore_ascii_case(&user.email));

            if taken {
                return Err(Report::new(StoreError::Duplicate)
                    .attach_printable("user id or email is already registered"));
            }

            records.users.push(user);
            Ok(())
        });
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip(self), name = "store.memory.get_project")]
    fn get_project<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Project>>> {
        let result = self
            .read()
            .map(|records| records.projects.iter().find(|p| p.id == id).cloned());
        future::ready(result).boxed()
    }

    #[tracing::instrument(
        skip_all,
        fields(project.id = %project.id),
        name = "store.memory.put_project"
    )]
    fn put_project(&self, project: Project) -> BoxFuture<'_, Result<()>> {
        let result = self.write().map(|mut records| {
            if let Some(existing) = records.projects.iter_mut().find(|p| p.id == project.id) {
                *existing = project;
            } else {
                records.projects.push(project);
            }
        });
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip(self), name = "store.memory.list_projects")]
    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>> {
        let result = self.read().map(|records| records.projects.clone());
        future::ready(result).boxed()
    }

    #[tracing::instrument(skip(self), name = "store.memory.list_messages")]
    fn list_messages<'a>(
        &'a self,
        project_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>>> {
        let result = self.read().map(|records| {
            records
                .messages
                .iter()
                .filter(|m| project_id.map_or(true, |id| m.project_id == id))
                .cloned()
                .collect()
        });
        future::ready(result).boxed()
    }

    #[tracing::instrument(
        skip_all,
        fields(message.id = %message.id),
        name = "store.memory.put_message"
    )]
    fn put_message(&self, message: ChatMessage) -> BoxFuture<'_, Result<()>> {
        let result = self.write().and_then(|mut records| {
            if records.messages.iter().any(|m| m.id == message.id) {
                return Err(Report::new(StoreError::Duplicate)
                    .attach_printable("message id is already taken"));
            }
            records.messages.push(message);
            Ok(())
        });
        future::ready(result).boxed()
    }
}
