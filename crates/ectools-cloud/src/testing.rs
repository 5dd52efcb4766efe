//! In-memory `ComputeApi` for tests
//!
//! Simulates the parts of the provider ectools touches: launching from known
//! templates, tag-filtered describe, and terminate with not-found errors for
//! unknown ids. Every request is recorded for assertions.

use crate::error::{ComputeError, Result};
use crate::provider::{
    ComputeApi, InstanceState, RemoteInstance, Reservation, RunInstancesRequest, TagFilter,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct FakeState {
    templates: BTreeSet<String>,
    /// One entry per RunInstances call, plus one per inserted instance
    reservations: Vec<Vec<RemoteInstance>>,
    next_id: u64,
    run_requests: Vec<RunInstancesRequest>,
    describe_filters: Vec<TagFilter>,
    terminate_requests: Vec<Vec<String>>,
}

/// In-memory compute provider
#[derive(Default)]
pub struct FakeCompute {
    state: Mutex<FakeState>,
}

impl FakeCompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake that knows the given launch templates
    pub fn with_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fake = Self::new();
        fake.state().templates = templates.into_iter().map(Into::into).collect();
        fake
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake compute state poisoned")
    }

    /// Add an instance that was not launched through ectools
    pub fn insert_instance(&self, instance: RemoteInstance) {
        self.state().reservations.push(vec![instance]);
    }

    /// Move an instance to a new state, optionally assigning a public IP
    pub fn set_state(&self, instance_id: &str, state: InstanceState, public_ip: Option<&str>) {
        let mut inner = self.state();
        if let Some(instance) = inner
            .reservations
            .iter_mut()
            .flatten()
            .find(|i| i.instance_id == instance_id)
        {
            instance.state = state;
            instance.public_ip = public_ip.map(str::to_string);
        }
    }

    /// Current state of an instance
    pub fn state_of(&self, instance_id: &str) -> Option<InstanceState> {
        self.state()
            .reservations
            .iter()
            .flatten()
            .find(|i| i.instance_id == instance_id)
            .map(|i| i.state.clone())
    }

    pub fn run_requests(&self) -> Vec<RunInstancesRequest> {
        self.state().run_requests.clone()
    }

    pub fn describe_filters(&self) -> Vec<TagFilter> {
        self.state().describe_filters.clone()
    }

    pub fn terminate_requests(&self) -> Vec<Vec<String>> {
        self.state().terminate_requests.clone()
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    fn name(&self) -> &str {
        "fake"
    }

    async fn run_instances(&self, request: &RunInstancesRequest) -> Result<Vec<String>> {
        let mut inner = self.state();
        inner.run_requests.push(request.clone());

        if !inner.templates.contains(&request.template.name) {
            return Err(ComputeError::new(
                "RunInstances",
                Some("InvalidLaunchTemplateName.NotFoundException"),
                format!(
                    "The specified launch template, with template name {}, does not exist.",
                    request.template.name
                ),
            )
            .into());
        }

        let tags: BTreeMap<String, String> = request
            .tags
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();

        let mut reservation = Vec::new();
        for _ in 0..request.max_count {
            inner.next_id += 1;
            reservation.push(RemoteInstance {
                instance_id: format!("i-{:017x}", inner.next_id),
                public_ip: None,
                state: InstanceState::Pending,
                tags: tags.clone(),
            });
        }

        let ids = reservation.iter().map(|i| i.instance_id.clone()).collect();
        inner.reservations.push(reservation);
        Ok(ids)
    }

    async fn describe_instances(&self, filter: &TagFilter) -> Result<Vec<Reservation>> {
        let mut inner = self.state();
        inner.describe_filters.push(filter.clone());

        Ok(inner
            .reservations
            .iter()
            .map(|instances| Reservation {
                instances: instances
                    .iter()
                    .filter(|i| filter.matches(&i.tags))
                    .cloned()
                    .collect(),
            })
            .filter(|r| !r.instances.is_empty())
            .collect())
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        let mut inner = self.state();
        inner.terminate_requests.push(instance_ids.to_vec());

        let known: BTreeSet<&str> = inner
            .reservations
            .iter()
            .flatten()
            .map(|i| i.instance_id.as_str())
            .collect();

        if let Some(missing) = instance_ids.iter().find(|id| !known.contains(id.as_str())) {
            return Err(ComputeError::new(
                "TerminateInstances",
                Some("InvalidInstanceID.NotFound"),
                format!("The instance ID '{}' does not exist", missing),
            )
            .into());
        }

        for instance in inner.reservations.iter_mut().flatten() {
            if instance_ids.contains(&instance.instance_id) {
                instance.state = InstanceState::ShuttingDown;
                instance.public_ip = None;
            }
        }
        Ok(())
    }
}
