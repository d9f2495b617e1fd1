use error_stack::Report;
use std::borrow::Cow;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(Cow<'static, str>),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Entity store is currently in read-only mode")]
    Readonly,
    #[error("Could not access the entity store")]
    Storage,
}

impl ServiceError {
    #[must_use]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = error_stack::Result<T, ServiceError>;

pub trait StoreResultExt {
    type Ok;

    /// Wraps a store failure into [`ServiceError::Readonly`]
    /// or [`ServiceError::Storage`].
    fn into_service_error(self) -> Result<Self::Ok>;
}

impl<T> StoreResultExt for std::result::Result<T, Report<StoreError>> {
    type Ok = T;

    fn into_service_error(self) -> Result<T> {
        self.map_err(|report| {
            let context = match report.current_context() {
                StoreError::Readonly => ServiceError::Readonly,
                _ => ServiceError::Storage,
            };
            report.change_context(context)
        })
    }
}
