//! Stream cluster - the platform's managed messaging cluster
//!
//! The heavyweight of the provider: a Dedicated cluster can take close to an
//! hour to provision, and resizing (changing CKUs) or renaming happens in
//! place through update. Tier is a tagged union; there are no sibling
//! nullable config blocks to nil-check.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::ClustersApi;
use crate::api::wire::{StreamCluster, StreamClusterSpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

use super::cloud_type;

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const PROVISIONED: &str = "PROVISIONED";
    pub const FAILED: &str = "FAILED";
    pub const DEPROVISIONING: &str = "DEPROVISIONING";
    pub const DEPROVISIONED: &str = "DEPROVISIONED";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("stream_cluster")
        .with_description("Managed messaging cluster")
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
            AttributeSchema::new("tier", AttributeType::Object)
                .required()
                .with_wire_name("tier")
                .with_description("Basic, Standard, or Dedicated with a cku count"),
        )
        .attribute(
            AttributeSchema::new("network_id", AttributeType::String).with_wire_name("network_id"),
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
        .transient(phases::DEPROVISIONING)
        .success(phases::DEPROVISIONED)
        .failure(phases::FAILED)
}

pub struct StreamClusterOps {
    client: Arc<dyn ClustersApi>,
    schema: ResourceSchema,
}

impl StreamClusterOps {
    pub fn new(client: Arc<dyn ClustersApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, cluster: StreamCluster) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &cluster.spec)?,
            identifier: cluster.metadata.id,
            status: cluster.status,
        })
    }
}

#[async_trait]
impl ResourceOps for StreamClusterOps {
    fn kind(&self) -> &'static str {
        "stream_cluster"
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
        let heavy = PollPolicy::fixed(Duration::from_secs(15), Duration::from_secs(60 * 60));
        Timeouts {
            create: heavy.clone(),
            update: heavy.clone(),
            delete: heavy,
        }
    }

    fn supports_update(&self) -> bool {
        true
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: StreamClusterSpec = spec_from_attributes(&self.schema, resource)?;
        let cluster = self
            .client
            .create_cluster(scope.environment_id(), spec)
            .await?;
        self.remote(cluster)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let cluster = self
            .client
            .get_cluster(scope.environment_id(), identifier)
            .await?;
        self.remote(cluster)
    }

    async fn update(
        &self,
        scope: &Scope,
        identifier: &str,
        resource: &Resource,
    ) -> ApiResult<RemoteObject> {
        let spec: StreamClusterSpec = spec_from_attributes(&self.schema, resource)?;
        let cluster = self
            .client
            .update_cluster(scope.environment_id(), identifier, spec)
            .await?;
        self.remote(cluster)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_cluster(scope.environment_id(), identifier)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use vela_core::resource::Value;
    use vela_core::wait::PhaseClass;

    use crate::api::wire::ClusterTier;

    use super::*;

    #[test]
    fn dedicated_tier_carries_its_cku_count() {
        let tier = Value::Map(HashMap::from([
            ("kind".to_string(), Value::String("Dedicated".to_string())),
            ("cku".to_string(), Value::Int(4)),
        ]));
        let resource = Resource::new("stream_cluster", "orders", Scope::environment("env-1"))
            .with_attribute("display_name", Value::String("orders".to_string()))
            .with_attribute("cloud", Value::String("AWS".to_string()))
            .with_attribute("region", Value::String("us-east-1".to_string()))
            .with_attribute("tier", tier)
            .with_attribute("network_id", Value::String("n-1".to_string()));

        let spec: StreamClusterSpec = spec_from_attributes(&schema(), &resource).unwrap();
        assert_eq!(spec.tier, ClusterTier::Dedicated { cku: 4 });
        assert_eq!(spec.network_id.as_deref(), Some("n-1"));
    }

    #[test]
    fn deprovision_has_an_explicit_terminal_phase() {
        let table = deprovision_phases();
        assert_eq!(table.classify(phases::DEPROVISIONED), PhaseClass::Success);
        assert_eq!(table.classify(phases::DEPROVISIONING), PhaseClass::Transient);
    }
}
