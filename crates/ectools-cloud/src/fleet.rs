//! Fleet manager: launch, status and terminate for tagged instance groups

use crate::error::Result;
use crate::model::{InstanceRecord, LaunchRequest};
use crate::provider::{ComputeApi, LaunchTemplateRef, RemoteInstance, RunInstancesRequest};
use crate::tags::{self, TAG_GROUP};
use tracing::{debug, info};

/// Manages ectools-tagged instances through a compute provider.
///
/// Every operation is one remote request. Remote failures come back unchanged;
/// nothing is retried or validated locally.
pub struct FleetManager<C> {
    client: C,
}

impl<C: ComputeApi> FleetManager<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying provider client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Launch `count` instances from the latest version of a launch template.
    ///
    /// All instances are tagged `ectools=1` and `group=<group>`. Returns the new
    /// instance ids in the order the provider listed them.
    pub async fn launch(&self, request: LaunchRequest) -> Result<Vec<String>> {
        let group_name = tags::resolve_group_name(request.group_name);
        let count = request.count.get();

        info!(
            provider = self.client.name(),
            template = %request.template_name,
            count,
            group = %group_name,
            "Launching instances"
        );

        let run = RunInstancesRequest {
            template: LaunchTemplateRef::latest(request.template_name),
            min_count: count,
            max_count: count,
            tags: tags::launch_tags(&group_name),
            overrides: request.overrides,
        };

        let ids = self.client.run_instances(&run).await?;

        debug!(group = %group_name, ids = ?ids, "Instances launched");
        Ok(ids)
    }

    /// Current status of every instance carrying the marker tag.
    ///
    /// Reservations are flattened; order is whatever the provider returned.
    pub async fn list_status(&self) -> Result<Vec<InstanceRecord>> {
        let reservations = self
            .client
            .describe_instances(&tags::marker_filter())
            .await?;

        let records: Vec<InstanceRecord> = reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(InstanceRecord::from)
            .collect();

        debug!(count = records.len(), "Fetched instance status");
        Ok(records)
    }

    /// Terminate the given instances in one request.
    ///
    /// Ids are forwarded as-is, including foreign or already-terminated ones.
    pub async fn terminate(&self, instance_ids: &[String]) -> Result<()> {
        info!(
            provider = self.client.name(),
            count = instance_ids.len(),
            "Terminating instances"
        );

        self.client.terminate_instances(instance_ids).await
    }
}

impl From<RemoteInstance> for InstanceRecord {
    fn from(instance: RemoteInstance) -> Self {
        let ready = instance.state.is_running();
        let mut tags = instance.tags;
        Self {
            instance_id: instance.instance_id,
            group_name: tags.remove(TAG_GROUP),
            ip: instance.public_ip,
            ready,
        }
    }
}
