use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::warn;

use super::{EntityStore, Result, StoreError};
use crate::config;
use crate::database::{self, ErrorExt, PoolConnection, ReportExt};
use crate::schema::{ChatMessage, Checkpoint, MessageKind, Project, User, UserRole};
use crate::util::Sensitive;

/// [`EntityStore`] backed by a Postgres database.
///
/// Writes always go to the primary pool. Reads go to the replica
/// pool if there is one, falling back to the primary pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    primary: database::Pool,
    replica: Option<database::Pool>,
}

impl PgStore {
    pub fn new(cfg: &config::Database) -> database::Result<Self> {
        let primary = database::Pool::build(cfg, &cfg.primary)?;
        let replica = cfg
            .replica
            .as_ref()
            .map(|replica| database::Pool::build(cfg, replica))
            .transpose()?;

        Ok(Self { primary, replica })
    }

    /// Applies the embedded migrations to the primary database.
    #[tracing::instrument(skip_all, name = "store.postgres.migrate")]
    pub async fn migrate(&self) -> database::Result<()> {
        self.primary.wait_until_healthy().await?;
        sqlx::migrate!("./migrations")
            .run(self.primary.inner())
            .await
            .change_context(database::Error::Migration)
    }

    async fn db_write(&self) -> Result<PoolConnection> {
        self.primary
            .get_writable()
            .await
            .map_err(|e| into_store_error(e, StoreError::Write))
    }

    async fn db_read(&self) -> Result<PoolConnection> {
        let Some(replica) = self.replica.as_ref() else {
            return self
                .primary
                .get()
                .await
                .map_err(|e| into_store_error(e, StoreError::Read));
        };

        match replica.get().await {
            Ok(conn) => Ok(conn),
            Err(error) => {
                warn!(?error, "Replica database is not available, falling back to primary");
                self.primary
                    .get()
                    .await
                    .map_err(|e| into_store_error(e, StoreError::Read))
            }
        }
    }
}

fn into_store_error(report: Report<database::Error>, context: StoreError) -> Report<StoreError> {
    if report.is_readonly() {
        report.change_context(StoreError::Readonly)
    } else if report.is_unique_violation() {
        report.change_context(StoreError::Duplicate)
    } else {
        report.change_context(context)
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    avatar: Option<String>,
    password: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = Report<StoreError>;

    fn try_from(row: UserRow) -> std::result::Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<UserRole>()
            .change_context(StoreError::Read)
            .attach_printable_lazy(|| format!("user {:?} has an invalid role", row.id))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            avatar: row.avatar,
            password: row.password.map(Sensitive::new),
        })
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: String,
    project_name: String,
    description: Option<String>,
    created_by: String,
    deadline: Option<String>,
    assigned_user_ids: Json<Vec<String>>,
    checkpoints: Json<Vec<Checkpoint>>,
    progress: i32,
    created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            project_name: row.project_name,
            description: row.description,
            created_by: row.created_by,
            deadline: row.deadline,
            assigned_user_ids: row.assigned_user_ids.0,
            checkpoints: row.checkpoints.0,
            progress: u8::try_from(row.progress.clamp(0, 100)).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: String,
    project_id: String,
    sender_id: String,
    sender_name: String,
    #[sqlx(rename = "type")]
    kind: String,
    content: Option<String>,
    timestamp: i64,
    file_name: Option<String>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            kind: MessageKind::from(row.kind),
            content: row.content,
            timestamp: row.timestamp,
            file_name: row.file_name,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, role, avatar, password";
const PROJECT_COLUMNS: &str = "id, project_name, description, created_by, deadline, \
    assigned_user_ids, checkpoints, progress, created_at";
const MESSAGE_COLUMNS: &str =
    "id, project_id, sender_id, sender_name, type, content, timestamp, file_name";

impl EntityStore for PgStore {
    #[tracing::instrument(skip(self), name = "store.postgres.get_user")]
    fn get_user<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<User>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let row = sqlx::query_as::<_, UserRow>(&format!(
                r#"SELECT {USER_COLUMNS} FROM "users" WHERE id = $1"#
            ))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Read))?;

            row.map(User::try_from).transpose()
        })
    }

    #[tracing::instrument(skip_all, name = "store.postgres.find_user_by_email")]
    fn find_user_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let row = sqlx::query_as::<_, UserRow>(&format!(
                r#"SELECT {USER_COLUMNS} FROM "users" WHERE lower(email) = lower($1) LIMIT 1"#
            ))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Read))?;

            row.map(User::try_from).transpose()
        })
    }

    #[tracing::instrument(skip(self), name = "store.postgres.list_users")]
    fn list_users(&self) -> BoxFuture<'_, Result<Vec<User>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let rows = sqlx::query_as::<_, UserRow>(&format!(
                r#"SELECT {USER_COLUMNS} FROM "users" ORDER BY seq ASC"#
            ))
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Read))?;

            rows.into_iter().map(User::try_from).collect()
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(user.id = %user.id),
        name = "store.postgres.insert_user"
    )]
    fn insert_user(&self, user: User) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.db_write().await?;
            sqlx::query(
                r#"INSERT INTO "users" (id, name, email, role, avatar, password)
                   VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.avatar.as_deref())
            .bind(user.password.as_ref().map(Sensitive::as_str))
            .execute(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Write))?;

            Ok(())
        })
    }

    #[tracing::instrument(skip(self), name = "store.postgres.get_project")]
    fn get_project<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Project>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let row = sqlx::query_as::<_, ProjectRow>(&format!(
                r#"SELECT {PROJECT_COLUMNS} FROM "projects" WHERE id = $1"#
            ))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Read))?;

            Ok(row.map(Project::from))
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(project.id = %project.id),
        name = "store.postgres.put_project"
    )]
    fn put_project(&self, project: Project) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.db_write().await?;

            // A single upsert statement, so concurrent writers of the same
            // project never observe each other's partial state.
            sqlx::query(
                r#"INSERT INTO "projects" (id, project_name, description, created_by,
                        deadline, assigned_user_ids, checkpoints, progress, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                   ON CONFLICT (id) DO UPDATE SET
                        project_name = EXCLUDED.project_name,
                        description = EXCLUDED.description,
                        created_by = EXCLUDED.created_by,
                        deadline = EXCLUDED.deadline,
                        assigned_user_ids = EXCLUDED.assigned_user_ids,
                        checkpoints = EXCLUDED.checkpoints,
                        progress = EXCLUDED.progress"#,
            )
            .bind(&project.id)
            .bind(&project.project_name)
            .bind(project.description.as_deref())
            .bind(&project.created_by)
            .bind(project.deadline.as_deref())
            .bind(Json(&project.assigned_user_ids))
            .bind(Json(&project.checkpoints))
            .bind(i32::from(project.progress))
            .bind(project.created_at)
            .execute(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Write))?;

            Ok(())
        })
    }

    #[tracing::instrument(skip(self), name = "store.postgres.list_projects")]
    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let rows = sqlx::query_as::<_, ProjectRow>(&format!(
                r#"SELECT {PROJECT_COLUMNS} FROM "projects" ORDER BY seq ASC"#
            ))
            .fetch_all(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Read))?;

            Ok(rows.into_iter().map(Project::from).collect())
        })
    }

    #[tracing::instrument(skip(self), name = "store.postgres.list_messages")]
    fn list_messages<'a>(
        &'a self,
        project_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<ChatMessage>>> {
        Box::pin(async move {
            let mut conn = self.db_read().await?;
            let query = if project_id.is_some() {
                format!(
                    r#"SELECT {MESSAGE_COLUMNS} FROM "messages"
                       WHERE project_id = $1 ORDER BY seq ASC"#
                )
            } else {
                format!(r#"SELECT {MESSAGE_COLUMNS} FROM "messages" ORDER BY seq ASC"#)
            };

            let mut query = sqlx::query_as::<_, MessageRow>(&query);
            if let Some(project_id) = project_id {
                query = query.bind(project_id);
            }

            let rows = query
                .fetch_all(&mut *conn)
                .await
                .into_db_error()
                .map_err(|e| into_store_error(e, StoreError::Read))?;

            Ok(rows.into_iter().map(ChatMessage::from).collect())
        })
    }

    #[tracing::instrument(
        skip_all,
        fields(message.id = %message.id),
        name = "store.postgres.put_message"
    )]
    fn put_message(&self, message: ChatMessage) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.db_write().await?;
            sqlx::query(
                r#"INSERT INTO "messages" (id, project_id, sender_id, sender_name,
                        type, content, timestamp, file_name)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(&message.id)
            .bind(&message.project_id)
            .bind(&message.sender_id)
            .bind(&message.sender_name)
            .bind(message.kind.as_str())
            .bind(message.content.as_deref())
            .bind(message.timestamp)
            .bind(message.file_name.as_deref())
            .execute(&mut *conn)
            .await
            .into_db_error()
            .map_err(|e| into_store_error(e, StoreError::Write))?;

            Ok(())
        })
    }
}
