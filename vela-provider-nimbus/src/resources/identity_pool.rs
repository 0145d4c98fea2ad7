//! Identity pool - maps external OIDC identities onto platform principals
//!
//! The IAM endpoints answer 403 rather than 404 for pools that do not exist,
//! so delete waits finish on either status; see
//! [`ApiError::is_gone`](crate::api::ApiError::is_gone).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::IamApi;
use crate::api::wire::{IdentityPool, IdentityPoolSpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

use super::https_url_type;

pub mod phases {
    pub const IN_PROGRESS: &str = "IN_PROGRESS";
    pub const DONE: &str = "DONE";
    pub const ERROR: &str = "ERROR";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("identity_pool")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("issuer", https_url_type())
                .required()
                .with_wire_name("issuer"),
        )
        .attribute(
            AttributeSchema::new("identity_claim", AttributeType::String)
                .required()
                .with_wire_name("identity_claim"),
        )
        .attribute(AttributeSchema::new("filter", AttributeType::String).with_wire_name("filter"))
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::IN_PROGRESS)
        .success(phases::DONE)
        .failure(phases::ERROR)
}

/// No explicit terminal phase: a deleted pool simply disappears
pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::DONE)
        .transient(phases::IN_PROGRESS)
        .failure(phases::ERROR)
}

pub struct IdentityPoolOps {
    client: Arc<dyn IamApi>,
    schema: ResourceSchema,
}

impl IdentityPoolOps {
    pub fn new(client: Arc<dyn IamApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, pool: IdentityPool) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &pool.spec)?,
            identifier: pool.metadata.id,
            status: pool.status,
        })
    }
}

#[async_trait]
impl ResourceOps for IdentityPoolOps {
    fn kind(&self) -> &'static str {
        "identity_pool"
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn provision_phases(&self) -> PhaseTable {
        provision_phases()
    }

    fn deprovision_phases(&self) -> PhaseTable {
        deprovision_phases()
    }

    fn timeouts(&self) -> Timeouts {
        let tight = PollPolicy::fixed(Duration::from_secs(2), Duration::from_secs(5 * 60));
        Timeouts {
            create: tight.clone(),
            update: tight.clone(),
            delete: tight,
        }
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: IdentityPoolSpec = spec_from_attributes(&self.schema, resource)?;
        let pool = self
            .client
            .create_identity_pool(scope.environment_id(), spec)
            .await?;
        self.remote(pool)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let pool = self
            .client
            .get_identity_pool(scope.environment_id(), identifier)
            .await?;
        self.remote(pool)
    }

    async fn update(
        &self,
        scope: &Scope,
        identifier: &str,
        resource: &Resource,
    ) -> ApiResult<RemoteObject> {
        let spec: IdentityPoolSpec = spec_from_attributes(&self.schema, resource)?;
        let pool = self
            .client
            .update_identity_pool(scope.environment_id(), identifier, spec)
            .await?;
        self.remote(pool)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_identity_pool(scope.environment_id(), identifier)
            .await
    }
}
