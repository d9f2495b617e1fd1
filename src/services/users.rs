use error_stack::Report;

use super::{Result, ServiceError, StoreResultExt};
use crate::schema::{User, UserRole};
use crate::store::{EntityStore, StoreError};
use crate::types::form::auth::{Login, Register};
use crate::util::{id, validation};

const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Placeholder avatar rendered from the initials of `name`.
#[must_use]
pub fn default_avatar(name: &str) -> String {
    let name = url::form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>();
    format!("{AVATAR_BASE_URL}?name={name}&background=random&color=fff")
}

#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Users<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, name = "services.users.register")]
    pub async fn register(&self, form: Register) -> Result<User> {
        let (Some(name), Some(email), Some(role)) = (
            form.name.filter(|v| !v.trim().is_empty()),
            form.email.filter(|v| !v.trim().is_empty()),
            form.role.filter(|v| !v.trim().is_empty()),
        ) else {
            return Err(Report::new(ServiceError::validation("Missing fields")));
        };

        let role = role
            .parse::<UserRole>()
            .map_err(|e| {
                Report::new(ServiceError::validation("Invalid role")).attach_printable(e)
            })?;

        if !validation::is_valid_email(&email) {
            return Err(Report::new(ServiceError::validation("Invalid email address")));
        }

        let taken = self
            .store
            .find_user_by_email(&email)
            .await
            .into_service_error()?
            .is_some();

        if taken {
            return Err(Report::new(ServiceError::validation("Email already exists")));
        }

        let avatar = form
            .avatar
            .filter(|v| validation::is_valid_url(v))
            .unwrap_or_else(|| default_avatar(&name));

        let user = User {
            id: id::generate("u"),
            name,
            email,
            role,
            avatar: Some(avatar),
            password: form.password,
        };

        // Another request may have taken the email in the meantime.
        self.store
            .insert_user(user.clone())
            .await
            .map_err(|report| match report.current_context() {
                StoreError::Duplicate => {
                    report.change_context(ServiceError::validation("Email already exists"))
                }
                _ => report.change_context(ServiceError::Storage),
            })?;

        tracing::info!(user.id = %user.id, "registered user");
        Ok(user)
    }

    #[tracing::instrument(skip_all, name = "services.users.login")]
    pub async fn login(&self, form: Login) -> Result<User> {
        let email = form.email.unwrap_or_default();
        let Some(user) = self
            .store
            .find_user_by_email(email.trim())
            .await
            .into_service_error()?
        else {
            return Err(Report::new(ServiceError::InvalidCredentials)
                .attach_printable("no user has this email"));
        };

        let attempt = form.password.as_ref().map(|v| v.as_str());
        if !user.accepts_password(attempt) {
            return Err(Report::new(ServiceError::InvalidCredentials)
                .attach_printable("password does not match"));
        }

        Ok(user)
    }

    #[tracing::instrument(skip(self), name = "services.users.get")]
    pub async fn get(&self, id: &str) -> Result<User> {
        self.store
            .get_user(id)
            .await
            .into_service_error()?
            .ok_or_else(|| {
                Report::new(ServiceError::NotFound("User"))
                    .attach_printable(format!("user id = {id:?}"))
            })
    }

    #[tracing::instrument(skip(self), name = "services.users.list")]
    pub async fn list(&self) -> Result<Vec<User>> {
        self.store.list_users().await.into_service_error()
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn register(name: &str, email: &str, role: &str) -> Register {
        Register {
            name: Some(name.into()),
            email: Some(email.into()),
            role: Some(role.into()),
            password: Some("hunter22".to_string().into()),
            avatar: None,
        }
    }

    #[track_caller]
    fn assert_validation<T: std::fmt::Debug>(result: Result<T>, message: &str) {
        let report = result.unwrap_err();
        assert_eq!(
            &ServiceError::Validation(message.to_string().into()),
            report.current_context()
        );
    }

    #[test]
    fn test_default_avatar() {
        assert_eq!(
            "https://ui-avatars.com/api/?name=Sarah+Dev&background=random&color=fff",
            default_avatar("Sarah Dev")
        );
    }

    #[tokio::test]
    async fn test_register() {
        let store = MemoryStore::new();
        let users = Users::new(&store);

        let user = users
            .register(register("Sarah Dev", "sarah@pranikov.com", "EMPLOYEE"))
            .await
            .unwrap();

        assert!(user.id.starts_with('u'));
        assert_eq!(33, user.id.len());
        assert_eq!(UserRole::Employee, user.role);
        assert_eq!(Some(default_avatar("Sarah Dev")), user.avatar);
        assert_eq!(user, users.get(&user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_forms() {
        let store = MemoryStore::new();
        let users = Users::new(&store);

        let mut form = register("Sarah Dev", "sarah@pranikov.com", "EMPLOYEE");
        form.role = None;
        assert_validation(users.register(form).await, "Missing fields");

        let form = register("  ", "sarah@pranikov.com", "EMPLOYEE");
        assert_validation(users.register(form).await, "Missing fields");

        let form = register("Sarah Dev", "sarah@pranikov.com", "INTERN");
        assert_validation(users.register(form).await, "Invalid role");

        let form = register("Sarah Dev", "sarah", "EMPLOYEE");
        assert_validation(users.register(form).await, "Invalid email address");

        assert!(users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let users = Users::new(&store);

        let form = register("Sarah Dev", "sarah@pranikov.com", "EMPLOYEE");
        users.register(form).await.unwrap();

        let form = register("Sarah Again", "SARAH@pranikov.com", "MANAGER");
        assert_validation(users.register(form).await, "Email already exists");
        assert_eq!(1, users.list().await.unwrap().len());
    }

    #[tokio::test]
    async fn test_login() {
        let store = MemoryStore::new();
        let users = Users::new(&store);
        let registered = users
            .register(register("Alex Manager", "manager@pranikov.com", "MANAGER"))
            .await
            .unwrap();

        let login = |email: &str, password: Option<&str>| Login {
            email: Some(email.into()),
            password: password.map(|v| v.to_string().into()),
        };

        let user = users
            .login(login("Manager@Pranikov.com", Some("hunter22")))
            .await
            .unwrap();
        assert_eq!(registered, user);

        // a missing password is accepted as is
        assert!(users.login(login("manager@pranikov.com", None)).await.is_ok());

        let report = users
            .login(login("manager@pranikov.com", Some("wrong")))
            .await
            .unwrap_err();
        assert_eq!(&ServiceError::InvalidCredentials, report.current_context());

        let report = users
            .login(login("nobody@pranikov.com", Some("hunter22")))
            .await
            .unwrap_err();
        assert_eq!(&ServiceError::InvalidCredentials, report.current_context());
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryStore::new();
        let report = Users::new(&store).get("u404").await.unwrap_err();
        assert_eq!(&ServiceError::NotFound("User"), report.current_context());
    }
}
