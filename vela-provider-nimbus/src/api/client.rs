//! Typed client traits for the Nimbus API families
//!
//! Implementations (the platform SDK, test doubles) own authentication,
//! request construction, and retry of failed transports. Each resource
//! module receives only the handle for the family it manages; nothing in
//! this crate holds a handle to every API at once.

use async_trait::async_trait;

use super::ApiResult;
use super::wire::{
    ApiKey, ApiKeySpec, ComputePool, ComputePoolSpec, Connector, ConnectorSpec, Gateway,
    GatewaySpec, IdentityPool, IdentityPoolSpec, Network, NetworkSpec, Peering, PeeringSpec,
    StreamCluster, StreamClusterSpec,
};

/// Networks, peerings, and gateways
#[async_trait]
pub trait NetworkingApi: Send + Sync {
    async fn create_network(&self, environment: &str, spec: NetworkSpec) -> ApiResult<Network>;
    async fn get_network(&self, environment: &str, id: &str) -> ApiResult<Network>;
    async fn delete_network(&self, environment: &str, id: &str) -> ApiResult<()>;

    async fn create_peering(&self, environment: &str, spec: PeeringSpec) -> ApiResult<Peering>;
    async fn get_peering(&self, environment: &str, id: &str) -> ApiResult<Peering>;
    async fn delete_peering(&self, environment: &str, id: &str) -> ApiResult<()>;

    async fn create_gateway(&self, environment: &str, spec: GatewaySpec) -> ApiResult<Gateway>;
    async fn get_gateway(&self, environment: &str, id: &str) -> ApiResult<Gateway>;
    async fn delete_gateway(&self, environment: &str, id: &str) -> ApiResult<()>;
}

/// Stream clusters and compute pools
#[async_trait]
pub trait ClustersApi: Send + Sync {
    async fn create_cluster(
        &self,
        environment: &str,
        spec: StreamClusterSpec,
    ) -> ApiResult<StreamCluster>;
    async fn get_cluster(&self, environment: &str, id: &str) -> ApiResult<StreamCluster>;
    async fn update_cluster(
        &self,
        environment: &str,
        id: &str,
        spec: StreamClusterSpec,
    ) -> ApiResult<StreamCluster>;
    async fn delete_cluster(&self, environment: &str, id: &str) -> ApiResult<()>;

    async fn create_compute_pool(
        &self,
        environment: &str,
        spec: ComputePoolSpec,
    ) -> ApiResult<ComputePool>;
    async fn get_compute_pool(&self, environment: &str, id: &str) -> ApiResult<ComputePool>;
    async fn delete_compute_pool(&self, environment: &str, id: &str) -> ApiResult<()>;
}

/// API keys and identity pools
#[async_trait]
pub trait IamApi: Send + Sync {
    async fn create_api_key(&self, environment: &str, spec: ApiKeySpec) -> ApiResult<ApiKey>;
    async fn get_api_key(&self, environment: &str, id: &str) -> ApiResult<ApiKey>;
    async fn delete_api_key(&self, environment: &str, id: &str) -> ApiResult<()>;

    async fn create_identity_pool(
        &self,
        environment: &str,
        spec: IdentityPoolSpec,
    ) -> ApiResult<IdentityPool>;
    async fn get_identity_pool(&self, environment: &str, id: &str) -> ApiResult<IdentityPool>;
    async fn update_identity_pool(
        &self,
        environment: &str,
        id: &str,
        spec: IdentityPoolSpec,
    ) -> ApiResult<IdentityPool>;
    async fn delete_identity_pool(&self, environment: &str, id: &str) -> ApiResult<()>;
}

/// Managed connectors, scoped to a cluster
#[async_trait]
pub trait ConnectApi: Send + Sync {
    async fn create_connector(
        &self,
        environment: &str,
        cluster: &str,
        spec: ConnectorSpec,
    ) -> ApiResult<Connector>;
    async fn get_connector(
        &self,
        environment: &str,
        cluster: &str,
        id: &str,
    ) -> ApiResult<Connector>;
    async fn update_connector(
        &self,
        environment: &str,
        cluster: &str,
        id: &str,
        spec: ConnectorSpec,
    ) -> ApiResult<Connector>;
    async fn delete_connector(&self, environment: &str, cluster: &str, id: &str) -> ApiResult<()>;
}
