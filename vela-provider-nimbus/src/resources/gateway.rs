//! Gateway - managed egress endpoint attached to an environment

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::ApiResult;
use crate::api::client::NetworkingApi;
use crate::api::wire::{Gateway, GatewaySpec};
use crate::binding::{RemoteObject, ResourceOps, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const READY: &str = "READY";
    pub const FAILED: &str = "FAILED";
    pub const DEPROVISIONING: &str = "DEPROVISIONING";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("gateway")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("config", AttributeType::Object)
                .required()
                .with_wire_name("config")
                .with_description("Egress config, discriminated by its kind field"),
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

pub struct GatewayOps {
    client: Arc<dyn NetworkingApi>,
    schema: ResourceSchema,
}

impl GatewayOps {
    pub fn new(client: Arc<dyn NetworkingApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, gateway: Gateway) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &gateway.spec)?,
            identifier: gateway.metadata.id,
            status: gateway.status,
        })
    }
}

#[async_trait]
impl ResourceOps for GatewayOps {
    fn kind(&self) -> &'static str {
        "gateway"
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
            create: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(20 * 60)),
            update: PollPolicy::default(),
            delete: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(20 * 60)),
        }
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: GatewaySpec = spec_from_attributes(&self.schema, resource)?;
        let gateway = self
            .client
            .create_gateway(scope.environment_id(), spec)
            .await?;
        self.remote(gateway)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let gateway = self
            .client
            .get_gateway(scope.environment_id(), identifier)
            .await?;
        self.remote(gateway)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_gateway(scope.environment_id(), identifier)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use vela_core::resource::Value;

    use crate::api::{LifecycleStatus, ObjectMeta};
    use crate::api::wire::GatewayConfig;

    use super::*;

    #[test]
    fn config_attribute_becomes_a_tagged_union() {
        let config = Value::Map(HashMap::from([
            (
                "kind".to_string(),
                Value::String("AwsEgressPrivateLink".to_string()),
            ),
            ("region".to_string(), Value::String("us-east-2".to_string())),
        ]));
        let resource = Resource::new("gateway", "egress", Scope::environment("env-1"))
            .with_attribute("display_name", Value::String("egress".to_string()))
            .with_attribute("config", config);

        let spec: GatewaySpec = spec_from_attributes(&schema(), &resource).unwrap();
        assert!(matches!(
            spec.config,
            GatewayConfig::AwsEgressPrivateLink { ref region } if region == "us-east-2"
        ));
    }

    #[test]
    fn remote_object_carries_the_config_back_as_a_map() {
        let ops = GatewayOps::new(Arc::new(NoopNetworking));
        let gateway = Gateway {
            metadata: ObjectMeta {
                id: "gw-1".to_string(),
                created_at: Utc::now(),
                updated_at: None,
            },
            spec: GatewaySpec {
                display_name: "egress".to_string(),
                config: GatewayConfig::AwsPrivateNetworkInterface {
                    region: "us-east-1".to_string(),
                    zones: vec!["use1-az1".to_string()],
                    account: "123456789012".to_string(),
                },
            },
            status: LifecycleStatus::phase(phases::READY),
        };

        let object = ops.remote(gateway).unwrap();
        assert_eq!(object.identifier, "gw-1");
        let config = object.attributes.get("config").unwrap();
        match config {
            Value::Map(map) => {
                assert_eq!(
                    map.get("kind"),
                    Some(&Value::String("AwsPrivateNetworkInterface".to_string()))
                );
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    struct NoopNetworking;

    #[async_trait]
    impl NetworkingApi for NoopNetworking {
        async fn create_network(
            &self,
            _: &str,
            _: crate::api::wire::NetworkSpec,
        ) -> ApiResult<crate::api::wire::Network> {
            unimplemented!()
        }
        async fn get_network(&self, _: &str, _: &str) -> ApiResult<crate::api::wire::Network> {
            unimplemented!()
        }
        async fn delete_network(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
        async fn create_peering(
            &self,
            _: &str,
            _: crate::api::wire::PeeringSpec,
        ) -> ApiResult<crate::api::wire::Peering> {
            unimplemented!()
        }
        async fn get_peering(&self, _: &str, _: &str) -> ApiResult<crate::api::wire::Peering> {
            unimplemented!()
        }
        async fn delete_peering(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
        async fn create_gateway(&self, _: &str, _: GatewaySpec) -> ApiResult<Gateway> {
            unimplemented!()
        }
        async fn get_gateway(&self, _: &str, _: &str) -> ApiResult<Gateway> {
            unimplemented!()
        }
        async fn delete_gateway(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
    }
}
