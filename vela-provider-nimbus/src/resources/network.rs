//! Network - environment-scoped private network
//!
//! Networks carry the longest provisioning times of the networking family;
//! a fresh network regularly takes the better part of an hour to reach
//! READY, so the create policy gets a full hour of budget.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::NetworkingApi;
use crate::api::wire::{Network, NetworkSpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

use super::{cidr_type, cloud_type};

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const READY: &str = "READY";
    pub const FAILED: &str = "FAILED";
    pub const DEPROVISIONING: &str = "DEPROVISIONING";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("network")
        .with_description("Private network hosting clusters and gateways")
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
        .attribute(AttributeSchema::new("cidr", cidr_type()).with_wire_name("cidr"))
        .attribute(
            AttributeSchema::new(
                "connection_types",
                AttributeType::List(Box::new(AttributeType::Enum(vec![
                    "PEERING".to_string(),
                    "PRIVATE_LINK".to_string(),
                    "TRANSIT_GATEWAY".to_string(),
                ]))),
            )
            .with_wire_name("connection_types"),
        )
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PROVISIONING)
        .success(phases::READY)
        .failure(phases::FAILED)
}

pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::READY)
        .transient(phases::DEPROVISIONING)
        .failure(phases::FAILED)
}

pub struct NetworkOps {
    client: Arc<dyn NetworkingApi>,
    schema: ResourceSchema,
}

impl NetworkOps {
    pub fn new(client: Arc<dyn NetworkingApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, network: Network) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &network.spec)?,
            identifier: network.metadata.id,
            status: network.status,
        })
    }
}

#[async_trait]
impl ResourceOps for NetworkOps {
    fn kind(&self) -> &'static str {
        "network"
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
            delete: PollPolicy::fixed(Duration::from_secs(15), Duration::from_secs(30 * 60)),
        }
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: NetworkSpec = spec_from_attributes(&self.schema, resource)?;
        let network = self
            .client
            .create_network(scope.environment_id(), spec)
            .await?;
        self.remote(network)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let network = self
            .client
            .get_network(scope.environment_id(), identifier)
            .await?;
        self.remote(network)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_network(scope.environment_id(), identifier)
            .await
    }
}
