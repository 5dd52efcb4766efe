//! AWS EC2 provider implementation

use crate::convert;
use crate::error::compute_error;
use crate::request;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_ec2::Client;
use ectools_cloud::{ComputeApi, Reservation, Result, RunInstancesRequest, TagFilter};
use tokio::sync::OnceCell;
use tracing::debug;

/// Where to load AWS configuration from.
///
/// Unset fields fall back to the SDK's default chain (environment, shared
/// config files, instance metadata).
#[derive(Debug, Clone, Default)]
pub struct AwsOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// Load SDK configuration
pub async fn load_sdk_config(options: &AwsOptions) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &options.profile {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

/// EC2-backed compute provider
#[derive(Clone, Debug)]
pub struct Ec2Compute {
    client: Client,
}

impl Ec2Compute {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }

    /// Build a provider from the environment
    pub async fn from_env(options: &AwsOptions) -> Self {
        let config = load_sdk_config(options).await;
        Self::from_sdk_config(&config)
    }

    /// Resolved region, if any
    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|r| r.as_ref())
    }
}

static SHARED: OnceCell<Ec2Compute> = OnceCell::const_new();

/// Process-wide provider, built on first use.
///
/// Concurrent first calls construct exactly one client. `options` only takes
/// effect on the call that performs the initialization.
pub async fn shared_client(options: &AwsOptions) -> &'static Ec2Compute {
    SHARED
        .get_or_init(|| async {
            debug!(region = ?options.region, profile = ?options.profile, "Initializing EC2 client");
            Ec2Compute::from_env(options).await
        })
        .await
}

#[async_trait]
impl ComputeApi for Ec2Compute {
    fn name(&self) -> &str {
        "aws-ec2"
    }

    async fn run_instances(&self, request: &RunInstancesRequest) -> Result<Vec<String>> {
        let output = request::run_instances(&self.client, request)?
            .send()
            .await
            .map_err(|e| compute_error("RunInstances", e))?;

        let ids: Vec<String> = output
            .instances()
            .iter()
            .filter_map(|i| i.instance_id())
            .map(str::to_string)
            .collect();

        debug!(count = ids.len(), "RunInstances returned");
        Ok(ids)
    }

    async fn describe_instances(&self, filter: &TagFilter) -> Result<Vec<Reservation>> {
        let mut pages = self
            .client
            .describe_instances()
            .filters(request::tag_filter(filter))
            .into_paginator()
            .send();

        let mut reservations = Vec::new();
        while let Some(page) = pages.next().await {
            let output = page.map_err(|e| compute_error("DescribeInstances", e))?;
            reservations.extend(output.reservations().iter().map(convert::reservation));
        }

        debug!(reservations = reservations.len(), "DescribeInstances returned");
        Ok(reservations)
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|e| compute_error("TerminateInstances", e))?;

        Ok(())
    }
}
