//! API key - credential bound to a principal, optionally to a cluster
//!
//! Keys activate within seconds; the poll policy is correspondingly tight.
//! The secret is returned exactly once, on the create response, and is
//! surfaced as a read-only attribute of the created state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope, Value};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::IamApi;
use crate::api::wire::{ApiKey, ApiKeySpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

pub mod phases {
    pub const PENDING: &str = "PENDING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const REVOKED: &str = "REVOKED";
    pub const FAILED: &str = "FAILED";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("api_key")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("description", AttributeType::String)
                .with_wire_name("description"),
        )
        .attribute(
            AttributeSchema::new("owner_id", AttributeType::String)
                .required()
                .with_wire_name("owner_id"),
        )
        .attribute(
            AttributeSchema::new("resource_id", AttributeType::String)
                .with_wire_name("resource_id"),
        )
        .attribute(AttributeSchema::new("secret", AttributeType::String).read_only())
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PENDING)
        .success(phases::ACTIVE)
        .failure(phases::FAILED)
}

pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::ACTIVE)
        .transient(phases::PENDING)
        .success(phases::REVOKED)
}

pub struct ApiKeyOps {
    client: Arc<dyn IamApi>,
    schema: ResourceSchema,
}

impl ApiKeyOps {
    pub fn new(client: Arc<dyn IamApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, key: ApiKey) -> ApiResult<RemoteObject> {
        let mut attributes = attributes_from_spec(&self.schema, &key.spec)?;
        // only present on the create response
        if let Some(secret) = key.secret {
            attributes.insert("secret".to_string(), Value::String(secret));
        }
        Ok(RemoteObject {
            attributes,
            identifier: key.metadata.id,
            status: key.status,
        })
    }
}

#[async_trait]
impl ResourceOps for ApiKeyOps {
    fn kind(&self) -> &'static str {
        "api_key"
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
        let tight = PollPolicy::fixed(Duration::from_secs(2), Duration::from_secs(5 * 60))
            .with_not_found_grace(Duration::from_secs(30));
        Timeouts {
            create: tight.clone(),
            update: tight.clone(),
            delete: tight,
        }
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: ApiKeySpec = spec_from_attributes(&self.schema, resource)?;
        let key = self
            .client
            .create_api_key(scope.environment_id(), spec)
            .await?;
        self.remote(key)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let key = self
            .client
            .get_api_key(scope.environment_id(), identifier)
            .await?;
        self.remote(key)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_api_key(scope.environment_id(), identifier)
            .await
    }
}
