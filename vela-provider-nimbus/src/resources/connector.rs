//! Connector - managed connector running inside a stream cluster
//!
//! The only cluster-scoped family: its import id carries three segments
//! (`<environment>/<cluster>/<connector>`), and the plugin configuration is
//! passed through to the platform verbatim.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use vela_core::import::{ClusterScopedId, ImportIdError};
use vela_core::resource::{Resource, Scope};
use vela_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use vela_core::wait::{PhaseTable, PollPolicy};

use crate::api::{ApiError, ApiResult};
use crate::api::client::ConnectApi;
use crate::api::wire::{Connector, ConnectorSpec};
use crate::binding::{RemoteObject, ResourceOps, ScopeLevel, Timeouts};
use crate::convert::{attributes_from_spec, spec_from_attributes};

pub mod phases {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const RUNNING: &str = "RUNNING";
    pub const FAILED: &str = "FAILED";
    pub const DEPROVISIONING: &str = "DEPROVISIONING";
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new("connector")
        .attribute(
            AttributeSchema::new("display_name", AttributeType::String)
                .required()
                .with_wire_name("display_name"),
        )
        .attribute(
            AttributeSchema::new("class", AttributeType::String)
                .required()
                .with_wire_name("class")
                .with_description("Connector plugin class, e.g. S3Sink"),
        )
        .attribute(
            AttributeSchema::new("config", AttributeType::Object)
                .required()
                .with_wire_name("config"),
        )
        .attribute(
            AttributeSchema::new("tasks_max", AttributeType::Int).with_wire_name("tasks_max"),
        )
}

pub fn provision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::PROVISIONING)
        .success(phases::RUNNING)
        .failure(phases::FAILED)
}

pub fn deprovision_phases() -> PhaseTable {
    PhaseTable::new()
        .transient(phases::RUNNING)
        .transient(phases::DEPROVISIONING)
        .failure(phases::FAILED)
}

pub struct ConnectorOps {
    client: Arc<dyn ConnectApi>,
    schema: ResourceSchema,
}

impl ConnectorOps {
    pub fn new(client: Arc<dyn ConnectApi>) -> Self {
        Self {
            client,
            schema: schema(),
        }
    }

    fn remote(&self, connector: Connector) -> ApiResult<RemoteObject> {
        Ok(RemoteObject {
            attributes: attributes_from_spec(&self.schema, &connector.spec)?,
            identifier: connector.metadata.id,
            status: connector.status,
        })
    }

    fn cluster_of(scope: &Scope) -> ApiResult<&str> {
        scope
            .cluster_id()
            .ok_or_else(|| ApiError::status(400, "connector operations need a cluster scope"))
    }
}

#[async_trait]
impl ResourceOps for ConnectorOps {
    fn kind(&self) -> &'static str {
        "connector"
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
            create: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(15 * 60)),
            update: PollPolicy::fixed(Duration::from_secs(10), Duration::from_secs(15 * 60)),
            delete: PollPolicy::fixed(Duration::from_secs(5), Duration::from_secs(10 * 60)),
        }
    }

    fn scope_level(&self) -> ScopeLevel {
        ScopeLevel::Cluster
    }

    fn supports_update(&self) -> bool {
        true
    }

    fn parse_import_id(&self, raw: &str) -> Result<(Scope, String), ImportIdError> {
        let id: ClusterScopedId = raw.parse()?;
        Ok((id.scope(), id.resource))
    }

    async fn create(&self, scope: &Scope, resource: &Resource) -> ApiResult<RemoteObject> {
        let spec: ConnectorSpec = spec_from_attributes(&self.schema, resource)?;
        let connector = self
            .client
            .create_connector(scope.environment_id(), Self::cluster_of(scope)?, spec)
            .await?;
        self.remote(connector)
    }

    async fn fetch(&self, scope: &Scope, identifier: &str) -> ApiResult<RemoteObject> {
        let connector = self
            .client
            .get_connector(scope.environment_id(), Self::cluster_of(scope)?, identifier)
            .await?;
        self.remote(connector)
    }

    async fn update(
        &self,
        scope: &Scope,
        identifier: &str,
        resource: &Resource,
    ) -> ApiResult<RemoteObject> {
        let spec: ConnectorSpec = spec_from_attributes(&self.schema, resource)?;
        let connector = self
            .client
            .update_connector(
                scope.environment_id(),
                Self::cluster_of(scope)?,
                identifier,
                spec,
            )
            .await?;
        self.remote(connector)
    }

    async fn delete(&self, scope: &Scope, identifier: &str) -> ApiResult<()> {
        self.client
            .delete_connector(scope.environment_id(), Self::cluster_of(scope)?, identifier)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use vela_core::resource::Value;

    use super::*;

    #[test]
    fn import_id_carries_three_segments() {
        let ops = ConnectorOps::new(Arc::new(NoopConnect));
        let (scope, identifier) = ops.parse_import_id("env-1/lkc-7/sink-orders").unwrap();
        assert_eq!(scope, Scope::cluster("env-1", "lkc-7"));
        assert_eq!(identifier, "sink-orders");

        assert!(ops.parse_import_id("env-1/sink-orders").is_err());
    }

    #[test]
    fn plugin_config_is_passed_through_verbatim() {
        let config = Value::Map(HashMap::from([
            (
                "s3.bucket.name".to_string(),
                Value::String("archive".to_string()),
            ),
            ("flush.size".to_string(), Value::Int(1000)),
        ]));
        let resource = Resource::new("connector", "sink", Scope::cluster("env-1", "lkc-7"))
            .with_attribute("display_name", Value::String("sink".to_string()))
            .with_attribute("class", Value::String("S3Sink".to_string()))
            .with_attribute("config", config);

        let spec: ConnectorSpec = spec_from_attributes(&schema(), &resource).unwrap();
        assert_eq!(spec.class, "S3Sink");
        assert_eq!(spec.config["s3.bucket.name"], json!("archive"));
        assert_eq!(spec.config["flush.size"], json!(1000));
    }

    struct NoopConnect;

    #[async_trait]
    impl ConnectApi for NoopConnect {
        async fn create_connector(
            &self,
            _: &str,
            _: &str,
            _: ConnectorSpec,
        ) -> ApiResult<Connector> {
            unimplemented!()
        }
        async fn get_connector(&self, _: &str, _: &str, _: &str) -> ApiResult<Connector> {
            unimplemented!()
        }
        async fn update_connector(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: ConnectorSpec,
        ) -> ApiResult<Connector> {
            unimplemented!()
        }
        async fn delete_connector(&self, _: &str, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
    }
}
