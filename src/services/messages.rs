use error_stack::Report;

use super::{Result, ServiceError, StoreResultExt};
use crate::schema::ChatMessage;
use crate::store::{EntityStore, StoreError};
use crate::types::form::messages::SendMessage;
use crate::util::{id, time};

#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Messages<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, form), name = "services.messages.send")]
    pub async fn send(&self, project_id: &str, form: SendMessage) -> Result<ChatMessage> {
        let Some(sender_id) = form.sender_id.filter(|v| !v.trim().is_empty()) else {
            return Err(Report::new(ServiceError::validation("Missing senderId")));
        };

        let exists = self
            .store
            .get_project(project_id)
            .await
            .into_service_error()?
            .is_some();

        if !exists {
            return Err(Report::new(ServiceError::NotFound("Project"))
                .attach_printable(format!("project id = {project_id:?}")));
        }

        let message = ChatMessage {
            id: id::or_generate(form.id, "m"),
            project_id: project_id.to_string(),
            sender_id,
            sender_name: form.sender_name.unwrap_or_default(),
            kind: form.kind.unwrap_or_default(),
            content: form.content,
            timestamp: form
                .timestamp
                .filter(|timestamp| *timestamp != 0)
                .unwrap_or_else(time::now_millis),
            file_name: form.file_name,
        };

        self.store
            .put_message(message.clone())
            .await
            .map_err(|report| match report.current_context() {
                StoreError::Duplicate => {
                    report.change_context(ServiceError::validation("Message already exists"))
                }
                StoreError::Readonly => report.change_context(ServiceError::Readonly),
                _ => report.change_context(ServiceError::Storage),
            })?;

        Ok(message)
    }

    /// Lists the messages of one project, or of every project if
    /// `project_id` is `None`, oldest first.
    ///
    /// Messages sharing a timestamp keep the order they were stored in.
    #[tracing::instrument(skip(self), name = "services.messages.list")]
    pub async fn list(&self, project_id: Option<&str>) -> Result<Vec<ChatMessage>> {
        let mut messages = self
            .store
            .list_messages(project_id)
            .await
            .into_service_error()?;

        // `sort_by_key` is stable
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }
}
