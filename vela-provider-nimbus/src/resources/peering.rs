//! Peering - connection between a network and a customer-owned VPC/VNet

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::NetworkingApi;
use crate::api::wire::{Peering, PeeringSpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    /// Waiting for the peer side to accept the connection
    pub const PENDING_ACCEPT: &str = "PENDING_ACCEPT";
    pub const READY: &str = "READY";
    pub const FAILED: &str = "FAILED";
    pub const DEPROVISIONING: &str = "DEPROVISIONING";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("peering")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("network_id", AttributeType::String)
                .required()
                .with_wire_name("network_id"),
        )
        .attribute(
            AttributeSchema::new("peer", AttributeType::Object)
                .required()
                .with_wire_name("peer")
                .with_description("Peer side config, discriminated by its kind field"),
        )
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PROVISIONING)
        .transient(phases::PENDING_ACCEPT)
        .success(phases::READY)
        .failure(phases::FAILED)
}

pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::READY)
        .transient(phases::DEPROVISIONING)
        .failure(phases::FAILED)
}

pub struct PeeringOps {
    client: Arc<dyn NetworkingApi>,
    schema: ResourceSchema,
}

impl PeeringOps {
    pub fn new(client: Arc<dyn NetworkingApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, peering: Peering) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &peering.spec)?,
            identifier: peering.metadata.id,
            status: peering.status,
        })
    }
}

#[async_trait]
impl ResourceOps for PeeringOps {
    fn kind(&self) -> &'static str {
        "peering"
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
            create: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(10 * 60)),
            update: PollPolicy::default(),
            delete: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(10 * 60)),
        }
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: PeeringSpec = spec_from_attributes(&self.schema, resource)?;
        let peering = self
            .client
            .create_peering(scope.environment_id(), spec)
            .await?;
        self.remote(peering)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let peering = self
            .client
            .get_peering(scope.environment_id(), identifier)
            .await?;
        self.remote(peering)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_peering(scope.environment_id(), identifier)
            .await
    }
}
