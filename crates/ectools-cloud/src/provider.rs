//! Compute provider trait definition
//!
//! `ComputeApi` is the only seam between the fleet manager and the remote
//! provisioning service. Each method maps to exactly one remote operation.

use crate::error::Result;
use crate::model::LaunchOverrides;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Launch template version that always resolves to the newest one
pub const LATEST_TEMPLATE_VERSION: &str = "$Latest";

/// Remote compute-provisioning service
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Returns the provider name (e.g., "aws-ec2")
    fn name(&self) -> &str;

    /// RunInstances: returns the new instance ids in the order the service lists them
    async fn run_instances(&self, request: &RunInstancesRequest) -> Result<Vec<String>>;

    /// DescribeInstances restricted to instances carrying the given tag
    async fn describe_instances(&self, filter: &TagFilter) -> Result<Vec<Reservation>>;

    /// TerminateInstances for the whole list in one request
    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()>;
}

/// A single key/value tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Exact-match tag filter (`tag:<key>` = value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub values: Vec<String>,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }

    /// Filter name as the provider spells it
    pub fn name(&self) -> String {
        format!("tag:{}", self.key)
    }

    /// Check whether a tag set satisfies this filter
    pub fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        tags.get(&self.key)
            .is_some_and(|v| self.values.iter().any(|want| want == v))
    }
}

/// Reference to a remote launch template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplateRef {
    pub name: String,
    pub version: String,
}

impl LaunchTemplateRef {
    /// Latest version of the named template
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: LATEST_TEMPLATE_VERSION.to_string(),
        }
    }
}

/// One RunInstances call
#[derive(Debug, Clone)]
pub struct RunInstancesRequest {
    pub template: LaunchTemplateRef,

    pub min_count: u32,

    pub max_count: u32,

    /// Tags applied to every created instance
    pub tags: Vec<Tag>,

    pub overrides: LaunchOverrides,
}

/// The provider's grouping of instances launched together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservation {
    pub instances: Vec<RemoteInstance>,
}

/// An instance as the provider describes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInstance {
    pub instance_id: String,

    pub public_ip: Option<String>,

    pub state: InstanceState,

    pub tags: BTreeMap<String, String>,
}

/// Lifecycle state reported by the provider.
///
/// ectools only observes this; it never drives transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Other(String),
}

impl InstanceState {
    /// Parse a provider state name ("pending", "running", ...)
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => InstanceState::Pending,
            "running" => InstanceState::Running,
            "shutting-down" => InstanceState::ShuttingDown,
            "terminated" => InstanceState::Terminated,
            "stopping" => InstanceState::Stopping,
            "stopped" => InstanceState::Stopped,
            other => InstanceState::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::ShuttingDown => write!(f, "shutting-down"),
            InstanceState::Terminated => write!(f, "terminated"),
            InstanceState::Stopping => write!(f, "stopping"),
            InstanceState::Stopped => write!(f, "stopped"),
            InstanceState::Other(name) => write!(f, "{}", name),
        }
    }
}
