//! Binding - Generic CRUD engine over resource descriptors
//!
//! One implementation of the create→wait→refetch lifecycle, the delete wait
//! with gone-detection, read with not-found mapping, and composite-id
//! import. Resource modules supply a [`ResourceOps`] descriptor — operations
//! against their API family, a schema, a phase vocabulary, and poll
//! policies — and everything else lives here once.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use vela_core::import::{EnvScopedId, ImportIdError};
use vela_core::provider::{ProviderError, ProviderResult};
use vela_core::resource::{RemoteState, Resource, ResourceId, Scope, Value};
use vela_core::schema::ResourceSchema;
use vela_core::wait::{PhaseTable, PollPolicy, StatusReport, WaitMode, WaitOutcome, Waiter};

use crate::api::{ApiError, ApiResult, LifecycleStatus};

/// What a fetch returns: enough for status probing and for state mapping
#[derive(Debug, Clone)]
pub struct RemoteObject {
    pub identifier: String,
    pub status: LifecycleStatus,
    pub attributes: HashMap<String, Value>,
}

/// Scope level a resource family requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    Environment,
    Cluster,
}

/// Poll policies per mutating operation
#[derive(Debug, Clone, Default)]
pub struct Timeouts {
    pub create: PollPolicy,
    pub update: PollPolicy,
    pub delete: PollPolicy,
}

/// Per-family descriptor the engine is parameterized by
#[async_trait]
pub trait ResourceOps: Send + Sync {
    fn kind(&self) -> &'static str;

    fn schema(&self) -> &ResourceSchema;

    /// Phase vocabulary while the object is being created or updated
    fn provision_phases(&self) -> PhaseTable;

    /// Phase vocabulary while the object is being deleted; disappearance of
    /// the object itself always counts as success
    fn deprovision_phases(&self) -> PhaseTable;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    fn scope_level(&self) -> ScopeLevel {
        ScopeLevel::Environment
    }

    fn supports_update(&self) -> bool {
        false
    }

    /// Parse this family's composite import id into scope + identifier
    fn parse_import_id(&self, raw: &str) -> Result<(Scope, String), ImportIdError> {
        let id: EnvScopedId = raw.parse()?;
        Ok((id.scope(), id.resource))
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject>;

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject>;

    async fn update(
        &self,
        _scope: &Scope,
        _identifier: &str,
        _resource: &Resource,
    ) -> ApiResult<RemoteObject> {
        Err(ApiError::status(
            405,
            format!("{} does not support updates", self.kind()),
        ))
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()>;
}

/// The CRUD engine for one resource family
pub struct ResourceBinding {
    ops: Arc<dyn ResourceOps>,
}

impl ResourceBinding {
    pub fn new(ops: Arc<dyn ResourceOps>) -> Self {
        Self { ops }
    }

    pub fn kind(&self) -> &'static str {
        self.ops.kind()
    }

    pub fn schema(&self) -> &ResourceSchema {
        self.ops.schema()
    }

    pub async fn create(&self, resource: &Resource) -> ProviderResult<RemoteState> {
        self.check_scope(&resource.id, &resource.scope)?;
        self.validate(resource)?;

        log::debug!("creating {} in {}", resource.id, resource.scope);
        let created = self
            .ops
            .create(&resource.scope, resource)
            .await
            .map_err(|e| self.api_error(&resource.id, "create", e))?;

        let outcome = self
            .await_terminal(
                &resource.scope,
                &created.identifier,
                WaitMode::Provision,
                self.ops.timeouts().create,
            )
            .await;
        self.outcome_to_result(&resource.id, "create", outcome)?;

        // the remote status is authoritative; read back the final attributes
        let object = self
            .ops
            .fetch(&resource.scope, &created.identifier)
            .await
            .map_err(|e| self.api_error(&resource.id, "read back", e))?;
        Ok(self.to_state(&resource.id, object))
    }

    pub async fn read(
        &self,
        id: &ResourceId,
        scope: &Scope,
        identifier: Option<&str>,
    ) -> ProviderResult<RemoteState> {
        self.check_scope(id, scope)?;
        let Some(identifier) = identifier else {
            return Ok(RemoteState::not_found(id.clone()));
        };
        match self.ops.fetch(scope, identifier).await {
            Ok(object) => Ok(self.to_state(id, object)),
            Err(e) if e.is_gone() => Ok(RemoteState::not_found(id.clone())),
            Err(e) => Err(self.api_error(id, "read", e)),
        }
    }

    pub async fn update(
        &self,
        resource: &Resource,
        identifier: &str,
    ) -> ProviderResult<RemoteState> {
        self.check_scope(&resource.id, &resource.scope)?;
        if !self.ops.supports_update() {
            return Err(ProviderError::unsupported(format!(
                "{} does not support in-place updates, delete and recreate",
                self.kind()
            ))
            .for_resource(resource.id.clone()));
        }
        self.validate(resource)?;

        log::debug!("updating {} ({})", resource.id, identifier);
        self.ops
            .update(&resource.scope, identifier, resource)
            .await
            .map_err(|e| self.api_error(&resource.id, "update", e))?;

        let outcome = self
            .await_terminal(
                &resource.scope,
                identifier,
                WaitMode::Provision,
                self.ops.timeouts().update,
            )
            .await;
        self.outcome_to_result(&resource.id, "update", outcome)?;

        let object = self
            .ops
            .fetch(&resource.scope, identifier)
            .await
            .map_err(|e| self.api_error(&resource.id, "read back", e))?;
        Ok(self.to_state(&resource.id, object))
    }

    pub async fn delete(
        &self,
        id: &ResourceId,
        scope: &Scope,
        identifier: &str,
    ) -> ProviderResult<()> {
        self.check_scope(id, scope)?;

        log::debug!("deleting {} ({})", id, identifier);
        match self.ops.delete(scope, identifier).await {
            Ok(()) => {}
            // deletion is idempotent: an object that is already gone is done
            Err(e) if e.is_gone() => {
                log::debug!("{} ({}) already gone", id, identifier);
                return Ok(());
            }
            Err(e) => return Err(self.api_error(id, "delete", e)),
        }

        let outcome = self
            .await_terminal(scope, identifier, WaitMode::Deprovision, self.ops.timeouts().delete)
            .await;
        self.outcome_to_result(id, "delete", outcome)
    }

    pub async fn import(&self, name: &str, raw: &str) -> ProviderResult<RemoteState> {
        let id = ResourceId::new(self.kind(), name);
        let (scope, identifier) = self
            .ops
            .parse_import_id(raw)
            .map_err(|e| ProviderError::validation(e.to_string()).for_resource(id.clone()))?;
        let state = self.read(&id, &scope, Some(&identifier)).await?;
        if !state.exists {
            return Err(ProviderError::api(format!(
                "cannot import {}: {} not found in {}",
                id, identifier, scope
            ))
            .for_resource(id));
        }
        Ok(state)
    }

    async fn await_terminal(
        &self,
        scope: &Scope,
        identifier: &str,
        mode: WaitMode,
        policy: PollPolicy,
    ) -> WaitOutcome {
        let table = match mode {
            WaitMode::Provision => self.ops.provision_phases(),
            WaitMode::Deprovision => self.ops.deprovision_phases(),
        };
        let waiter = match mode {
            WaitMode::Provision => Waiter::provision(self.kind(), identifier, table),
            WaitMode::Deprovision => Waiter::deprovision(self.kind(), identifier, table),
        }
        .in_scope(scope.to_string())
        .with_policy(policy);

        let ops = Arc::clone(&self.ops);
        let scope = scope.clone();
        let identifier = identifier.to_string();
        waiter
            .wait(move || {
                let ops = Arc::clone(&ops);
                let scope = scope.clone();
                let identifier = identifier.clone();
                async move {
                    let object = ops.fetch(&scope, &identifier).await?;
                    Ok(StatusReport {
                        phase: object.status.phase,
                        detail: object.status.error_detail,
                    })
                }
            })
            .await
    }

    fn outcome_to_result(
        &self,
        id: &ResourceId,
        operation: &str,
        outcome: WaitOutcome,
    ) -> ProviderResult<()> {
        match outcome {
            WaitOutcome::Success { .. } => Ok(()),
            WaitOutcome::Failure { detail, .. } => {
                Err(ProviderError::api(format!("{} failed: {}", operation, detail))
                    .for_resource(id.clone()))
            }
            WaitOutcome::TimedOut { last_phase, waited } => Err(ProviderError::timeout(format!(
                "{} did not complete: still in phase {} after {:?}",
                operation,
                last_phase.as_deref().unwrap_or("unknown"),
                waited
            ))
            .for_resource(id.clone())),
            WaitOutcome::Cancelled => {
                Err(ProviderError::cancelled(format!("{} was cancelled", operation))
                    .for_resource(id.clone()))
            }
        }
    }

    fn to_state(&self, id: &ResourceId, object: RemoteObject) -> RemoteState {
        RemoteState::existing(id.clone(), object.attributes).with_identifier(object.identifier)
    }

    fn check_scope(&self, id: &ResourceId, scope: &Scope) -> ProviderResult<()> {
        let ok = match self.ops.scope_level() {
            ScopeLevel::Environment => matches!(scope, Scope::Environment(_)),
            ScopeLevel::Cluster => matches!(scope, Scope::Cluster { .. }),
        };
        if ok {
            Ok(())
        } else {
            Err(ProviderError::validation(format!(
                "{} requires {} scope, got \"{}\"",
                self.kind(),
                match self.ops.scope_level() {
                    ScopeLevel::Environment => "an environment",
                    ScopeLevel::Cluster => "a cluster",
                },
                scope
            ))
            .for_resource(id.clone()))
        }
    }

    fn validate(&self, resource: &Resource) -> ProviderResult<()> {
        self.ops.schema().validate(&resource.attributes).map_err(|errors| {
            let details = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            ProviderError::validation(format!("invalid attributes: {}", details))
                .for_resource(resource.id.clone())
        })
    }

    fn api_error(&self, id: &ResourceId, operation: &str, err: ApiError) -> ProviderError {
        ProviderError::api(format!("{} failed: {}", operation, err))
            .with_cause(err)
            .for_resource(id.clone())
    }
}
