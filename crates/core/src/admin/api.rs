//! The post storage API as seen by admin tooling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AdminSecret, AdminToken, AuthError};
use crate::post::{Post, PostInput, PostPatch, PostService, ServiceError, ValidationErrors};
use crate::store::StoreError;

/// A failed call: HTTP-style status, a user-facing message and, for
/// validation failures, messages per field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ApiFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn not_found() -> Self {
        Self::new(404, "Blog post not found")
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            fields: errors.to_messages(),
            ..Self::new(400, "Validation failed")
        }
    }

    pub fn is_auth(&self) -> bool {
        self.status == 401
    }
}

impl From<AuthError> for ApiFailure {
    fn from(err: AuthError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => Self::validation(&errors),
            ServiceError::Slug(err) => Self::new(409, err.to_string()),
            ServiceError::SlugTaken(slug)
            | ServiceError::Store(StoreError::SlugConflict(slug)) => {
                Self::new(409, format!("Slug '{slug}' is already in use"))
            }
            ServiceError::NotFound(_)
            | ServiceError::SlugNotFound(_)
            | ServiceError::Store(StoreError::NotFound(_)) => Self::not_found(),
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "post store failure");
                Self::new(500, "An internal error occurred")
            }
        }
    }
}

/// Admin operations on posts. Every call carries the caller's token.
#[async_trait]
pub trait PostApi: Send + Sync {
    async fn list(&self, token: &AdminToken) -> Result<Vec<Post>, ApiFailure>;

    async fn get(&self, token: &AdminToken, id: Uuid) -> Result<Post, ApiFailure>;

    async fn create(&self, token: &AdminToken, input: PostInput) -> Result<Post, ApiFailure>;

    async fn update(
        &self,
        token: &AdminToken,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, ApiFailure>;

    async fn delete(&self, token: &AdminToken, id: Uuid) -> Result<(), ApiFailure>;
}

/// [`PostApi`] served in-process by a [`PostService`].
#[derive(Clone)]
pub struct LocalPostApi {
    service: PostService,
    secret: AdminSecret,
}

impl LocalPostApi {
    pub fn new(service: PostService, secret: AdminSecret) -> Self {
        Self { service, secret }
    }

    fn authorize(&self, token: &AdminToken) -> Result<(), ApiFailure> {
        self.secret.verify_token(token).map_err(|err| {
            tracing::debug!(error = %err, "admin call rejected");
            ApiFailure::from(err)
        })
    }
}

#[async_trait]
impl PostApi for LocalPostApi {
    async fn list(&self, token: &AdminToken) -> Result<Vec<Post>, ApiFailure> {
        self.authorize(token)?;
        Ok(self.service.list_all().await?)
    }

    async fn get(&self, token: &AdminToken, id: Uuid) -> Result<Post, ApiFailure> {
        self.authorize(token)?;
        Ok(self.service.get(id).await?)
    }

    async fn create(&self, token: &AdminToken, input: PostInput) -> Result<Post, ApiFailure> {
        self.authorize(token)?;
        Ok(self.service.create(input).await?)
    }

    async fn update(
        &self,
        token: &AdminToken,
        id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, ApiFailure> {
        self.authorize(token)?;
        Ok(self.service.update(id, patch).await?)
    }

    async fn delete(&self, token: &AdminToken, id: Uuid) -> Result<(), ApiFailure> {
        self.authorize(token)?;
        self.service.delete(id).await?;
        Ok(())
    }
}
