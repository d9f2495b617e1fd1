//! Process startup: picks the entity store, runs migrations
//! and inserts the demo data.
use chrono::Utc;
use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::config;
use crate::progress;
use crate::schema::{
    ChatMessage, Checkpoint, CheckpointStatus, MessageKind, Project, Task, TaskStatus, User,
    UserRole,
};
use crate::store::{EntityStore, MemoryStore, PgStore};
use crate::util::time;

#[derive(Debug, Error)]
#[error("Failed to bootstrap the entity store")]
pub struct BootstrapError;

/// Entity store selected from the configuration.
#[derive(Debug, Clone)]
pub struct Storage {
    pub store: Arc<dyn EntityStore>,
    postgres: Option<PgStore>,
}

impl Storage {
    /// Connects to Postgres if `db` is set, otherwise
    /// falls back to a [`MemoryStore`].
    pub fn open(db: Option<&config::Database>) -> Result<Self, BootstrapError> {
        let Some(db) = db else {
            tracing::warn!("No database configured, records are kept in memory");
            return Ok(Self {
                store: Arc::new(MemoryStore::new()),
                postgres: None,
            });
        };

        let postgres = PgStore::new(db).change_context(BootstrapError)?;
        Ok(Self {
            store: Arc::new(postgres.clone()),
            postgres: Some(postgres),
        })
    }

    /// Brings the database schema up to date. Does nothing
    /// for the in-memory store.
    #[tracing::instrument(skip_all)]
    pub async fn migrate(&self) -> Result<(), BootstrapError> {
        if let Some(postgres) = self.postgres.as_ref() {
            tracing::info!("Running database migrations");
            postgres.migrate().await.change_context(BootstrapError)?;
        }
        Ok(())
    }
}

/// What [`seed`] inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Seeded {
    pub users: usize,
    pub projects: usize,
    pub messages: usize,
}

/// Inserts the demo users, project and messages.
///
/// Each kind of record is only seeded if the store holds none of
/// it yet, so running this again never duplicates anything.
#[tracing::instrument(skip_all)]
pub async fn seed(store: &dyn EntityStore) -> Result<Seeded, BootstrapError> {
    let mut seeded = Seeded::default();

    if store
        .list_users()
        .await
        .change_context(BootstrapError)?
        .is_empty()
    {
        for user in users() {
            store.insert_user(user).await.change_context(BootstrapError)?;
            seeded.users += 1;
        }
    }

    if store
        .list_projects()
        .await
        .change_context(BootstrapError)?
        .is_empty()
    {
        for project in projects() {
            store
                .put_project(progress::recompute(project))
                .await
                .change_context(BootstrapError)?;
            seeded.projects += 1;
        }
    }

    if store
        .list_messages(None)
        .await
        .change_context(BootstrapError)?
        .is_empty()
    {
        for message in messages(time::now_millis()) {
            store.put_message(message).await.change_context(BootstrapError)?;
            seeded.messages += 1;
        }
    }

    tracing::info!(
        users = seeded.users,
        projects = seeded.projects,
        messages = seeded.messages,
        "Seeded entity store"
    );
    Ok(seeded)
}

fn users() -> Vec<User> {
    let user = |id: &str, name: &str, email: &str, role, color: &str| User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        avatar: Some(format!(
            "https://ui-avatars.com/api/?name={}&background={color}&color=fff",
            name.replace(' ', "+")
        )),
        password: Some("123".to_string().into()),
    };

    vec![
        user(
            "u1",
            "Alex Manager",
            "manager@pranikov.com",
            UserRole::Manager,
            "6366f1",
        ),
        user(
            "u2",
            "Sarah Dev",
            "sarah@pranikov.com",
            UserRole::Employee,
            "10b981",
        ),
        user(
            "u3",
            "John Designer",
            "john@pranikov.com",
            UserRole::Employee,
            "f59e0b",
        ),
    ]
}

fn projects() -> Vec<Project> {
    let task = |id: &str, title: &str, status| Task {
        id: id.into(),
        title: title.into(),
        status,
        assigned_to: None,
    };

    vec![Project {
        id: "p1".into(),
        project_name: "Website Redesign".into(),
        description: Some("Overhaul the corporate website with new branding.".into()),
        created_by: "u1".into(),
        deadline: Some("2023-12-31".into()),
        assigned_user_ids: vec!["u2".into(), "u3".into()],
        checkpoints: vec![
            Checkpoint {
                id: "c1".into(),
                title: "Design Phase".into(),
                description: "Create Figma mockups for all pages.".into(),
                deadline: "2023-11-01".into(),
                status: CheckpointStatus::Completed,
                tasks: vec![
                    task("t1", "Homepage Mockup", TaskStatus::Completed),
                    task("t2", "About Us Mockup", TaskStatus::Completed),
                ],
            },
            Checkpoint {
                id: "c2".into(),
                title: "Development Phase".into(),
                description: "Implement React components.".into(),
                deadline: "2023-12-01".into(),
                status: CheckpointStatus::Pending,
                tasks: vec![
                    task("t3", "Setup Repo", TaskStatus::Completed),
                    task("t4", "Build Header/Footer", TaskStatus::Pending),
                ],
            },
        ],
        progress: 0,
        created_at: Utc::now(),
    }]
}

fn messages(now: i64) -> Vec<ChatMessage> {
    let message = |id: &str, sender_id: &str, sender_name: &str, content: &str, ago: i64| {
        ChatMessage {
            id: id.into(),
            project_id: "p1".into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            kind: MessageKind::Text,
            content: Some(content.into()),
            timestamp: now - ago,
            file_name: None,
        }
    };

    vec![
        message(
            "m1",
            "u1",
            "Alex Manager",
            "Welcome to the project team!",
            10_000_000,
        ),
        message(
            "m2",
            "u2",
            "Sarah Dev",
            "Thanks Alex, ready to start.",
            9_000_000,
        ),
    ]
}
