//! Compute pool - elastic stream-processing capacity

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::ClustersApi;
use crate::api::wire::{ComputePool, ComputePoolSpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

use super::cloud_type;

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const PROVISIONED: &str = "PROVISIONED";
    pub const FAILED: &str = "FAILED";
    pub const DELETING: &str = "DELETING";
}

fn max_cfu_type() -> AttributeType {
    AttributeType::Custom {
        name: "MaxCfu".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            vela_core::resource::Value::Int(n) if (1..=50).contains(n) => Ok(()),
            vela_core::resource::Value::Int(n) => {
                Err(format!("max_cfu must be between 1 and 50, got {}", n))
            }
            _ => Err("Expected int".to_string()),
        },
    }
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("compute_pool")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("cloud", cloud_type())
                .required()
                .with_wire_name("cloud"),
        )
        .attribute(
            AttributeSchema::new("region", AttributeType::String)
                .required()
                .with_wire_name("region"),
        )
        .attribute(
            AttributeSchema::new("max_cfu", max_cfu_type())
                .required()
                .with_wire_name("max_cfu"),
        )
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PROVISIONING)
        .success(phases::PROVISIONED)
        .failure(phases::FAILED)
}

pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PROVISIONED)
        .transient(phases::DELETING)
        .failure(phases::FAILED)
}

pub struct ComputePoolOps {
    client: Arc<dyn ClustersApi>,
    schema: ResourceSchema,
}

impl ComputePoolOps {
    pub fn new(client: Arc<dyn ClustersApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, pool: ComputePool) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &pool.spec)?,
            identifier: pool.metadata.id,
            status: pool.status,
        })
    }
}

#[async_trait]
impl ResourceOps for ComputePoolOps {
    fn kind(&self) -> &'static str {
        "compute_pool"
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
        Timeouts {
            create: PollPolicy::fixed(Duration::from_secs(15), Duration::from_secs(60 * 60)),
            update: PollPolicy::default(),
            delete: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(20 * 60)),
        }
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: ComputePoolSpec = spec_from_attributes(&self.schema, resource)?;
        let pool = self
            .client
            .create_compute_pool(scope.environment_id(), spec)
            .await?;
        self.remote(pool)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let pool = self
            .client
            .get_compute_pool(scope.environment_id(), identifier)
            .await?;
        self.remote(pool)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_compute_pool(scope.environment_id(), identifier)
            .await
    }
}
