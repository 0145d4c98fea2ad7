//! Wire types for the Nimbus API
//!
//! Every object follows the platform envelope: identity in `metadata`, the
//! caller-declared `spec`, and the platform-owned `status`. Provider-specific
//! configuration blocks are tagged unions discriminated by a `kind` field
//! rather than families of nullable sibling fields.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{LifecycleStatus, ObjectMeta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    Peering,
    PrivateLink,
    TransitGateway,
}

// ---------------------------------------------------------------------------
// Networking family
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub display_name: String,
    pub cloud: CloudProvider,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connection_types: Vec<ConnectionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub metadata: ObjectMeta,
    pub spec: NetworkSpec,
    pub status: LifecycleStatus,
}

/// Peer side of a network peering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PeerConfig {
    AwsVpc {
        vpc_id: String,
        account: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        routes: Vec<String>,
    },
    AzureVnet {
        vnet_id: String,
        tenant: String,
    },
    GcpVpc {
        project: String,
        network_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeeringSpec {
    pub display_name: String,
    pub network_id: String,
    pub peer: PeerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peering {
    pub metadata: ObjectMeta,
    pub spec: PeeringSpec,
    pub status: LifecycleStatus,
}

/// Egress configuration of a gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GatewayConfig {
    AwsEgressPrivateLink {
        region: String,
    },
    AwsPrivateNetworkInterface {
        region: String,
        zones: Vec<String>,
        account: String,
    },
    AzureEgressPrivateLink {
        region: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySpec {
    pub display_name: String,
    pub config: GatewayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub metadata: ObjectMeta,
    pub spec: GatewaySpec,
    pub status: LifecycleStatus,
}

// ---------------------------------------------------------------------------
// Cluster family
// ---------------------------------------------------------------------------

/// Cluster tier; Dedicated carries its capacity in CKUs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClusterTier {
    Basic,
    Standard,
    Dedicated { cku: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamClusterSpec {
    pub display_name: String,
    pub cloud: CloudProvider,
    pub region: String,
    pub tier: ClusterTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCluster {
    pub metadata: ObjectMeta,
    pub spec: StreamClusterSpec,
    pub status: LifecycleStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputePoolSpec {
    pub display_name: String,
    pub cloud: CloudProvider,
    pub region: String,
    pub max_cfu: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputePool {
    pub metadata: ObjectMeta,
    pub spec: ComputePoolSpec,
    pub status: LifecycleStatus,
}

// ---------------------------------------------------------------------------
// Identity family
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeySpec {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Principal the key acts as
    pub owner_id: String,
    /// Cluster the key is bound to; absent for platform-level keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub metadata: ObjectMeta,
    pub spec: ApiKeySpec,
    pub status: LifecycleStatus,
    /// Returned once, on the create response only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityPoolSpec {
    pub display_name: String,
    /// OIDC issuer URL
    pub issuer: String,
    /// Claim that maps an external identity onto a principal
    pub identity_claim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityPool {
    pub metadata: ObjectMeta,
    pub spec: IdentityPoolSpec,
    pub status: LifecycleStatus,
}

// ---------------------------------------------------------------------------
// Connect family
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub display_name: String,
    /// Connector plugin class (e.g., "S3Sink")
    pub class: String,
    /// Plugin-specific configuration, passed through verbatim
    pub config: Json,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub metadata: ObjectMeta,
    pub spec: ConnectorSpec,
    pub status: LifecycleStatus,
}
