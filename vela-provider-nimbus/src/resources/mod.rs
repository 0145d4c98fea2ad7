//! Resource families
//!
//! One module per family: its phase vocabulary, attribute schema, and the
//! [`ResourceOps`](crate::binding::ResourceOps) descriptor that binds the
//! family to its API client. The modules stay small on purpose — the CRUD
//! lifecycle itself lives in [`crate::binding`].

use std::sync::LazyLock;

use regex::Regex;

use vela_core::resource::Value;
use vela_core::schema::AttributeType;

pub mod api_key;
pub mod compute_pool;
pub mod connector;
pub mod gateway;
pub mod identity_pool;
pub mod network;
pub mod peering;
pub mod stream_cluster;

pub use api_key::ApiKeyOps;
pub use compute_pool::ComputePoolOps;
pub use connector::ConnectorOps;
pub use gateway::GatewayOps;
pub use identity_pool::IdentityPoolOps;
pub use network::NetworkOps;
pub use peering::PeeringOps;
pub use stream_cluster::StreamClusterOps;

/// Cloud providers the platform runs on
pub(crate) fn cloud_type() -> AttributeType {
    AttributeType::Enum(vec![
        "AWS".to_string(),
        "AZURE".to_string(),
        "GCP".to_string(),
    ])
}

static CIDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}/\d{1,2}$").unwrap());

/// IPv4 CIDR block
pub(crate) fn cidr_type() -> AttributeType {
    AttributeType::Custom {
        name: "Cidr".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if CIDR_RE.is_match(s) => Ok(()),
            Value::String(s) => Err(format!("'{}' is not a CIDR block", s)),
            _ => Err("Expected string".to_string()),
        },
    }
}

static HTTPS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https://[^\s/]+\S*$").unwrap());

/// HTTPS URL (OIDC issuers)
pub(crate) fn https_url_type() -> AttributeType {
    AttributeType::Custom {
        name: "HttpsUrl".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if HTTPS_URL_RE.is_match(s) => Ok(()),
            Value::String(s) => Err(format!("'{}' is not an https:// URL", s)),
            _ => Err("Expected string".to_string()),
        },
    }
}
