//! NimbusProvider - dispatches provider operations to resource bindings
//!
//! Construction takes one typed handle per API family; each resource
//! descriptor receives only the handle it needs. There is no shared mutable
//! client object.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use vela_core::provider::{Provider, ProviderError, ProviderResult};
use vela_core::resource::{RemoteState, Resource, ResourceId, Scope};

use crate::api::client::{ClustersApi, ConnectApi, IamApi, NetworkingApi};
use crate::binding::{ResourceBinding, ResourceOps};
use crate::resources::{
    ApiKeyOps, ComputePoolOps, ConnectorOps, GatewayOps, IdentityPoolOps, NetworkOps, PeeringOps,
    StreamClusterOps,
};

/// Typed client handles, one per API family
#[derive(Clone)]
pub struct NimbusClients {
    pub networking: Arc<dyn NetworkingApi>,
    pub clusters: Arc<dyn ClustersApi>,
    pub iam: Arc<dyn IamApi>,
    pub connect: Arc<dyn ConnectApi>,
}

pub struct NimbusProvider {
    bindings: HashMap<&'static str, ResourceBinding>,
}

impl NimbusProvider {
    pub fn new(clients: NimbusClients) -> Self {
        let ops: Vec<Arc<dyn ResourceOps>> = vec![
            Arc::new(NetworkOps::new(clients.networking.clone())),
            Arc::new(PeeringOps::new(clients.networking.clone())),
            Arc::new(GatewayOps::new(clients.networking)),
            Arc::new(StreamClusterOps::new(clients.clusters.clone())),
            Arc::new(ComputePoolOps::new(clients.clusters)),
            Arc::new(ApiKeyOps::new(clients.iam.clone())),
            Arc::new(IdentityPoolOps::new(clients.iam)),
            Arc::new(ConnectorOps::new(clients.connect)),
        ];
        let bindings = ops
            .into_iter()
            .map(|ops| (ops.kind(), ResourceBinding::new(ops)))
            .collect();
        Self { bindings }
    }

    fn binding(&self, kind: &str) -> ProviderResult<&ResourceBinding> {
        self.bindings
            .get(kind)
            .ok_or_else(|| ProviderError::validation(format!("unknown resource kind: {}", kind)))
    }
}

#[async_trait]
impl Provider for NimbusProvider {
    fn name(&self) -> &'static str {
        "nimbus"
    }

    fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.bindings.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    async fn read(
        &self,
        id: &ResourceId,
        scope: &Scope,
        identifier: Option<&str>,
    ) -> ProviderResult<RemoteState> {
        self.binding(&id.kind)?.read(id, scope, identifier).await
    }

    async fn create(&self, resource: &Resource) -> ProviderResult<RemoteState> {
        self.binding(&resource.id.kind)?.create(resource).await
    }

    async fn update(&self, resource: &Resource, identifier: &str) -> ProviderResult<RemoteState> {
        self.binding(&resource.id.kind)?
            .update(resource, identifier)
            .await
    }

    async fn delete(
        &self,
        id: &ResourceId,
        scope: &Scope,
        identifier: &str,
    ) -> ProviderResult<()> {
        self.binding(&id.kind)?.delete(id, scope, identifier).await
    }

    async fn import(
        &self,
        kind: &str,
        name: &str,
        import_id: &str,
    ) -> ProviderResult<RemoteState> {
        self.binding(kind)?.import(name, import_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use vela_core::provider::ErrorKind;
    use vela_core::resource::Value;

    use crate::api::wire::{
        ApiKey, ApiKeySpec, ComputePool, ComputePoolSpec, Connector, ConnectorSpec, Gateway,
        GatewaySpec, IdentityPool, IdentityPoolSpec, Network, NetworkSpec, Peering, PeeringSpec,
        StreamCluster, StreamClusterSpec,
    };
    use crate::api::{ApiError, ApiResult, LifecycleStatus, ObjectMeta};
    use crate::resources::network::phases;

    use super::*;

    /// NetworkingApi double scripting the phases successive gets report;
    /// "GONE" answers 404
    struct MockNetworking {
        get_phases: Mutex<Vec<&'static str>>,
        gets: AtomicUsize,
    }

    impl MockNetworking {
        fn new(get_phases: Vec<&'static str>) -> Self {
            Self {
                get_phases: Mutex::new(get_phases),
                gets: AtomicUsize::new(0),
            }
        }

        fn network(&self, id: &str, phase: &str) -> Network {
            Network {
                metadata: ObjectMeta::new(id),
                spec: NetworkSpec {
                    display_name: "main".to_string(),
                    cloud: crate::api::wire::CloudProvider::Aws,
                    region: "eu-west-1".to_string(),
                    cidr: Some("10.1.0.0/16".to_string()),
                    connection_types: vec![],
                },
                status: LifecycleStatus::phase(phase),
            }
        }
    }

    #[async_trait]
    impl NetworkingApi for MockNetworking {
        async fn create_network(&self, _: &str, spec: NetworkSpec) -> ApiResult<Network> {
            let mut network = self.network("n-100", phases::PROVISIONING);
            network.spec = spec;
            Ok(network)
        }

        async fn get_network(&self, _: &str, id: &str) -> ApiResult<Network> {
            let n = self.gets.fetch_add(1, Ordering::SeqCst);
            let script = self.get_phases.lock().unwrap();
            let phase = script[n.min(script.len() - 1)];
            if phase == "GONE" {
                Err(ApiError::not_found("no such network"))
            } else {
                Ok(self.network(id, phase))
            }
        }

        async fn delete_network(&self, _: &str, _: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn create_peering(&self, _: &str, _: PeeringSpec) -> ApiResult<Peering> {
            unimplemented!()
        }
        async fn get_peering(&self, _: &str, _: &str) -> ApiResult<Peering> {
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

    struct NoopClusters;

    #[async_trait]
    impl ClustersApi for NoopClusters {
        async fn create_cluster(&self, _: &str, _: StreamClusterSpec) -> ApiResult<StreamCluster> {
            unimplemented!()
        }
        async fn get_cluster(&self, _: &str, _: &str) -> ApiResult<StreamCluster> {
            unimplemented!()
        }
        async fn update_cluster(
            &self,
            _: &str,
            _: &str,
            _: StreamClusterSpec,
        ) -> ApiResult<StreamCluster> {
            unimplemented!()
        }
        async fn delete_cluster(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
        async fn create_compute_pool(&self, _: &str, _: ComputePoolSpec) -> ApiResult<ComputePool> {
            unimplemented!()
        }
        async fn get_compute_pool(&self, _: &str, _: &str) -> ApiResult<ComputePool> {
            unimplemented!()
        }
        async fn delete_compute_pool(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
    }

    struct NoopIam;

    #[async_trait]
    impl IamApi for NoopIam {
        async fn create_api_key(&self, _: &str, _: ApiKeySpec) -> ApiResult<ApiKey> {
            unimplemented!()
        }
        async fn get_api_key(&self, _: &str, _: &str) -> ApiResult<ApiKey> {
            unimplemented!()
        }
        async fn delete_api_key(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
        async fn create_identity_pool(
            &self,
            _: &str,
            _: IdentityPoolSpec,
        ) -> ApiResult<IdentityPool> {
            unimplemented!()
        }
        async fn get_identity_pool(&self, _: &str, _: &str) -> ApiResult<IdentityPool> {
            unimplemented!()
        }
        async fn update_identity_pool(
            &self,
            _: &str,
            _: &str,
            _: IdentityPoolSpec,
        ) -> ApiResult<IdentityPool> {
            unimplemented!()
        }
        async fn delete_identity_pool(&self, _: &str, _: &str) -> ApiResult<()> {
            unimplemented!()
        }
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

    fn provider(networking: MockNetworking) -> NimbusProvider {
        NimbusProvider::new(NimbusClients {
            networking: Arc::new(networking),
            clusters: Arc::new(NoopClusters),
            iam: Arc::new(NoopIam),
            connect: Arc::new(NoopConnect),
        })
    }

    fn declared_network() -> Resource {
        Resource::new("network", "main", Scope::environment("env-1"))
            .with_attribute("display_name", Value::String("main".to_string()))
            .with_attribute("cloud", Value::String("AWS".to_string()))
            .with_attribute("region", Value::String("eu-west-1".to_string()))
            .with_attribute("cidr", Value::String("10.1.0.0/16".to_string()))
    }

    #[test]
    fn all_families_are_registered() {
        let provider = provider(MockNetworking::new(vec![]));
        assert_eq!(
            provider.kinds(),
            vec![
                "api_key",
                "compute_pool",
                "connector",
                "gateway",
                "identity_pool",
                "network",
                "peering",
                "stream_cluster",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn create_polls_the_network_to_ready() {
        let provider = provider(MockNetworking::new(vec![
            phases::PROVISIONING,
            phases::READY,
            phases::READY,
        ]));

        let state = provider.create(&declared_network()).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("n-100"));
        assert_eq!(
            state.attributes.get("cidr"),
            Some(&Value::String("10.1.0.0/16".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn delete_polls_until_the_network_is_gone() {
        let provider = provider(MockNetworking::new(vec![phases::DEPROVISIONING, "GONE"]));

        provider
            .delete(
                &ResourceId::new("network", "main"),
                &Scope::environment("env-1"),
                "n-100",
            )
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn import_reads_through_the_composite_id() {
        let provider = provider(MockNetworking::new(vec![phases::READY]));

        let state = provider
            .import("network", "main", "env-1/n-100")
            .await
            .unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("n-100"));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_kind_is_a_validation_error() {
        let provider = provider(MockNetworking::new(vec![]));

        let err = provider
            .read(
                &ResourceId::new("volcano", "main"),
                &Scope::environment("env-1"),
                Some("v-1"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
