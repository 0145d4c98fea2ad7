//! Provider - Contract between the engine and a platform binding
//!
//! A Provider manages the remote lifecycle of a set of resource kinds. All
//! operations are async and involve side effects against the platform API.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;

use crate::resource::{RemoteState, Resource, ResourceId, Scope};

/// Broad category of a provider failure
///
/// Callers phrase diagnostics from this: a timeout reads "still provisioning
/// after N minutes", not "provisioning failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The platform API rejected or failed the operation
    Api,
    /// The operation did not reach a terminal state within its time budget
    Timeout,
    /// The declared attributes or import id failed validation
    Validation,
    /// The resource family does not support the operation
    Unsupported,
    /// The operation was cancelled from outside
    Cancelled,
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn Error + Send + Sync>>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn Error)
    }
}

impl ProviderError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Main Provider trait
///
/// Each platform binding implements this trait. `read` returns a not-found
/// state (never an error) when the remote object does not exist, so callers
/// can plan re-creation. `import` re-associates an existing remote object
/// using its composite import id.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name of this provider (e.g., "nimbus")
    fn name(&self) -> &'static str;

    /// Resource kinds this provider can manage
    fn kinds(&self) -> Vec<&'static str>;

    /// Get the current state of a resource
    ///
    /// Without an identifier the resource cannot be located and a not-found
    /// state is returned.
    async fn read(
        &self,
        id: &ResourceId,
        scope: &Scope,
        identifier: Option<&str>,
    ) -> ProviderResult<RemoteState>;

    /// Create a resource and wait for it to finish provisioning
    async fn create(&self, resource: &Resource) -> ProviderResult<RemoteState>;

    /// Update a resource in place, where the family supports it
    async fn update(&self, resource: &Resource, identifier: &str) -> ProviderResult<RemoteState>;

    /// Delete a resource and wait for it to be gone
    async fn delete(&self, id: &ResourceId, scope: &Scope, identifier: &str)
    -> ProviderResult<()>;

    /// Look up an existing remote object by composite import id
    async fn import(&self, kind: &str, name: &str, import_id: &str)
    -> ProviderResult<RemoteState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_resource_id() {
        let err = ProviderError::api("boom").for_resource(ResourceId::new("network", "main"));
        assert_eq!(err.to_string(), "[network.main] boom");
    }

    #[test]
    fn error_display_without_resource_id() {
        let err = ProviderError::timeout("still provisioning");
        assert_eq!(err.to_string(), "still provisioning");
        assert!(err.is_timeout());
    }

    #[test]
    fn error_source_is_preserved() {
        let cause = std::io::Error::other("io");
        let err = ProviderError::api("request failed").with_cause(cause);
        assert!(err.source().is_some());
    }
}
