//! Resource - Representing declared resources and their remote state

use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a declared resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource kind (e.g., "network", "stream_cluster")
    pub kind: String,
    /// Resource name as declared in configuration
    pub name: String,
}

impl ResourceId {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

/// Parent scope a resource lives in
///
/// Every remote object belongs to an environment; some (connectors) are
/// additionally scoped to a cluster inside that environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Platform environment (e.g., "env-x7k2p")
    Environment(String),
    /// A cluster inside an environment
    Cluster {
        environment: String,
        cluster: String,
    },
}

impl Scope {
    pub fn environment(env: impl Into<String>) -> Self {
        Self::Environment(env.into())
    }

    pub fn cluster(env: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self::Cluster {
            environment: env.into(),
            cluster: cluster.into(),
        }
    }

    /// The environment id this scope belongs to
    pub fn environment_id(&self) -> &str {
        match self {
            Self::Environment(env) => env,
            Self::Cluster { environment, .. } => environment,
        }
    }

    /// The cluster id, if this scope is cluster-level
    pub fn cluster_id(&self) -> Option<&str> {
        match self {
            Self::Environment(_) => None,
            Self::Cluster { cluster, .. } => Some(cluster),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment(env) => write!(f, "{}", env),
            Self::Cluster {
                environment,
                cluster,
            } => write!(f, "{}/{}", environment, cluster),
        }
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Desired state of a resource as declared in configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub scope: Scope,
    pub attributes: HashMap<String, Value>,
}

impl Resource {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            id: ResourceId::new(kind, name),
            scope,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Current state of a remote object as observed through the platform API
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteState {
    pub id: ResourceId,
    /// Platform-assigned identifier (e.g., "n-8fx3w", "lkc-q2d7m")
    pub identifier: Option<String>,
    pub attributes: HashMap<String, Value>,
    /// Whether the remote object exists
    pub exists: bool,
}

impl RemoteState {
    pub fn not_found(id: ResourceId) -> Self {
        Self {
            id,
            identifier: None,
            attributes: HashMap::new(),
            exists: false,
        }
    }

    pub fn existing(id: ResourceId, attributes: HashMap<String, Value>) -> Self {
        Self {
            id,
            identifier: None,
            attributes,
            exists: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}
