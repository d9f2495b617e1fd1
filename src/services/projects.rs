use chrono::Utc;
use error_stack::Report;

use super::{Result, ServiceError, StoreResultExt};
use crate::progress;
use crate::schema::{Checkpoint, Project, UserRole};
use crate::store::EntityStore;
use crate::types::form::projects::{CreateProject, ListProjects};
use crate::util::id;

/// Visibility rules of [`Projects::list`].
///
/// Managers see every project. Anyone else only sees the projects
/// assigned to `user_id`, so a filter without a manager role or a
/// user id matches nothing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    /// `None` stands for a missing role or one the server does not
    /// know about. Both are treated like an employee.
    pub role: Option<UserRole>,
    pub user_id: Option<String>,
}

impl ProjectFilter {
    #[must_use]
    pub fn new(role: Option<UserRole>, user_id: Option<String>) -> Self {
        Self { role, user_id }
    }

    fn allows(&self, project: &Project) -> bool {
        if self.role == Some(UserRole::Manager) {
            return true;
        }
        self.user_id
            .as_deref()
            .filter(|user_id| !user_id.is_empty())
            .is_some_and(|user_id| project.is_assigned_to(user_id))
    }
}

impl From<ListProjects> for ProjectFilter {
    fn from(query: ListProjects) -> Self {
        let role = query.role.and_then(|role| role.parse().ok());
        Self::new(role, query.user_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Projects<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self), name = "services.projects.list")]
    pub async fn list(&self, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut projects = self.store.list_projects().await.into_service_error()?;
        projects.retain(|project| filter.allows(project));
        Ok(projects)
    }

    #[tracing::instrument(skip(self), name = "services.projects.get")]
    pub async fn get(&self, id: &str) -> Result<Project> {
        self.store
            .get_project(id)
            .await
            .into_service_error()?
            .ok_or_else(|| {
                Report::new(ServiceError::NotFound("Project"))
                    .attach_printable(format!("project id = {id:?}"))
            })
    }

    /// Creates a project from a loosely filled form.
    ///
    /// Missing fields get defaults and the progress is derived from the
    /// given checkpoints, never taken from the client.
    #[tracing::instrument(skip_all, name = "services.projects.create")]
    pub async fn create(&self, form: CreateProject) -> Result<Project> {
        let project = progress::recompute(Project {
            id: id::or_generate(form.id, "p"),
            project_name: form
                .project_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Untitled".into()),
            description: form.description,
            created_by: form.created_by.unwrap_or_default(),
            deadline: form.deadline,
            assigned_user_ids: form.assigned_user_ids.unwrap_or_default(),
            checkpoints: form.checkpoints.unwrap_or_default(),
            progress: 0,
            created_at: Utc::now(),
        });

        tracing::debug!(project.id = %project.id, "creating project");
        self.store
            .put_project(project.clone())
            .await
            .into_service_error()?;

        Ok(project)
    }

    /// Replaces the whole checkpoint tree of a project and recomputes
    /// its statuses and progress before storing it.
    #[tracing::instrument(skip(self, checkpoints), name = "services.projects.replace_checkpoints")]
    pub async fn replace_checkpoints(
        &self,
        id: &str,
        checkpoints: Vec<Checkpoint>,
    ) -> Result<Project> {
        let mut project = self.get(id).await?;
        project.checkpoints = checkpoints;

        let tally = progress::recompute_in_place(&mut project);
        tracing::debug!(
            tasks.total = tally.total,
            tasks.completed = tally.completed,
            progress = project.progress,
            "recomputed project progress"
        );

        self.store
            .put_project(project.clone())
            .await
            .into_service_error()?;

        Ok(project)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CheckpointStatus, Task, TaskStatus};
    use crate::store::MemoryStore;

    fn form(id: &str, assigned: &[&str]) -> CreateProject {
        CreateProject {
            id: Some(id.into()),
            project_name: Some(format!("Project {id}")),
            created_by: Some("u1".into()),
            assigned_user_ids: Some(assigned.iter().map(|v| (*v).to_string()).collect()),
            ..Default::default()
        }
    }

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: format!("Task {id}"),
            status,
            assigned_to: None,
        }
    }

    fn checkpoint(id: &str, status: CheckpointStatus, tasks: Vec<Task>) -> Checkpoint {
        Checkpoint {
            id: id.into(),
            title: format!("Checkpoint {id}"),
            description: String::new(),
            deadline: String::new(),
            status,
            tasks,
        }
    }

    fn ids(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_visibility() {
        let store = MemoryStore::new();
        let projects = Projects::new(&store);
        projects.create(form("p1", &["u2", "u3"])).await.unwrap();
        projects.create(form("p2", &["u3"])).await.unwrap();

        let list = |role, user_id: Option<&str>| {
            let filter = ProjectFilter::new(role, user_id.map(String::from));
            async move { projects.list(&filter).await.unwrap() }
        };

        let employee = list(Some(UserRole::Employee), Some("u2")).await;
        assert_eq!(vec!["p1"], ids(&employee));

        assert!(list(Some(UserRole::Employee), Some("u9")).await.is_empty());

        let manager = list(Some(UserRole::Manager), Some("u9")).await;
        assert_eq!(vec!["p1", "p2"], ids(&manager));

        let manager = list(Some(UserRole::Manager), None).await;
        assert_eq!(vec!["p1", "p2"], ids(&manager));

        let unknown_role = list(None, Some("u3")).await;
        assert_eq!(vec!["p1", "p2"], ids(&unknown_role));

        assert!(list(None, None).await.is_empty());
        assert!(list(Some(UserRole::Employee), Some("")).await.is_empty());
    }

    #[test]
    fn test_filter_from_query() {
        let filter = ProjectFilter::from(ListProjects {
            role: Some("MANAGER".into()),
            user_id: Some("u1".into()),
        });
        assert_eq!(Some(UserRole::Manager), filter.role);
        assert_eq!(Some("u1"), filter.user_id.as_deref());

        let filter = ProjectFilter::from(ListProjects {
            role: Some("manager".into()),
            user_id: Some("u1".into()),
        });
        assert_eq!(None, filter.role);
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let store = MemoryStore::new();
        let projects = Projects::new(&store);

        let project = projects.create(CreateProject::default()).await.unwrap();
        assert!(project.id.starts_with('p'));
        assert!(project.id.len() > 1);
        assert_eq!("Untitled", project.project_name);
        assert_eq!("", project.created_by);
        assert!(project.assigned_user_ids.is_empty());
        assert_eq!(0, project.progress);

        assert_eq!(project, projects.get(&project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_derives_progress() {
        let store = MemoryStore::new();
        let projects = Projects::new(&store);

        let mut form = form("p1", &["u2"]);
        form.checkpoints = Some(vec![checkpoint(
            "c1",
            CheckpointStatus::Pending,
            vec![task("t1", TaskStatus::Completed)],
        )]);

        let project = projects.create(form).await.unwrap();
        assert_eq!(100, project.progress);
        assert_eq!(CheckpointStatus::Completed, project.checkpoints[0].status);
    }

    #[tokio::test]
    async fn test_replace_checkpoints() {
        use TaskStatus::{Completed, Pending};

        let store = MemoryStore::new();
        let projects = Projects::new(&store);
        projects.create(form("p1", &["u2"])).await.unwrap();

        let replaced = projects
            .replace_checkpoints(
                "p1",
                vec![
                    checkpoint(
                        "c1",
                        CheckpointStatus::Pending,
                        vec![task("t1", Completed), task("t2", Completed)],
                    ),
                    checkpoint(
                        "c2",
                        CheckpointStatus::Completed,
                        vec![task("t3", Completed), task("t4", Pending)],
                    ),
                ],
            )
            .await
            .unwrap();

        assert_eq!(75, replaced.progress);
        assert_eq!(CheckpointStatus::Completed, replaced.checkpoints[0].status);
        assert_eq!(CheckpointStatus::Pending, replaced.checkpoints[1].status);

        let stored = projects.get("p1").await.unwrap();
        assert_eq!(replaced, stored);

        let emptied = projects.replace_checkpoints("p1", Vec::new()).await.unwrap();
        assert_eq!(0, emptied.progress);
        assert!(emptied.checkpoints.is_empty());
    }

    #[tokio::test]
    async fn test_missing_project() {
        let store = MemoryStore::new();
        let projects = Projects::new(&store);

        let report = projects.get("p404").await.unwrap_err();
        assert_eq!(&ServiceError::NotFound("Project"), report.current_context());

        let report = projects
            .replace_checkpoints("p404", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(&ServiceError::NotFound("Project"), report.current_context());
        let manager = ProjectFilter::new(Some(UserRole::Manager), None);
        assert!(projects.list(&manager).await.unwrap().is_empty());
    }
}
