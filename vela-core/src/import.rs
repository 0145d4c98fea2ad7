//! Import - Typed parsing of composite import identifiers
//!
//! Existing remote objects are re-associated with declared configuration via
//! delimiter-joined ids such as `env-x7k2p/n-8fx3w`. Parsing is centralized
//! here with explicit validation errors instead of ad hoc string splitting
//! per resource module.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::resource::Scope;

const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportIdError {
    #[error("import id is empty")]
    Empty,

    #[error("import id \"{input}\" has {found} segment(s), expected {expected}")]
    SegmentCount {
        input: String,
        found: usize,
        expected: usize,
    },

    #[error("import id \"{input}\" has an empty segment at position {position}")]
    EmptySegment { input: String, position: usize },
}

fn split_segments(input: &str, expected: usize) -> Result<Vec<&str>, ImportIdError> {
    if input.is_empty() {
        return Err(ImportIdError::Empty);
    }
    let segments: Vec<&str> = input.split(SEPARATOR).collect();
    if segments.len() != expected {
        return Err(ImportIdError::SegmentCount {
            input: input.to_string(),
            found: segments.len(),
            expected,
        });
    }
    if let Some(position) = segments.iter().position(|s| s.is_empty()) {
        return Err(ImportIdError::EmptySegment {
            input: input.to_string(),
            position,
        });
    }
    Ok(segments)
}

/// `<environment>/<resource>` import id for environment-scoped objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvScopedId {
    pub environment: String,
    pub resource: String,
}

impl EnvScopedId {
    pub fn scope(&self) -> Scope {
        Scope::environment(self.environment.clone())
    }
}

impl FromStr for EnvScopedId {
    type Err = ImportIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let segments = split_segments(input, 2)?;
        Ok(Self {
            environment: segments[0].to_string(),
            resource: segments[1].to_string(),
        })
    }
}

impl fmt::Display for EnvScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.environment, SEPARATOR, self.resource)
    }
}

/// `<environment>/<cluster>/<resource>` import id for cluster-scoped objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterScopedId {
    pub environment: String,
    pub cluster: String,
    pub resource: String,
}

impl ClusterScopedId {
    pub fn scope(&self) -> Scope {
        Scope::cluster(self.environment.clone(), self.cluster.clone())
    }
}

impl FromStr for ClusterScopedId {
    type Err = ImportIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let segments = split_segments(input, 3)?;
        Ok(Self {
            environment: segments[0].to_string(),
            cluster: segments[1].to_string(),
            resource: segments[2].to_string(),
        })
    }
}

impl fmt::Display for ClusterScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.environment, SEPARATOR, self.cluster, SEPARATOR, self.resource
        )
    }
}
