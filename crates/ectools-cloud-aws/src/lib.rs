//! AWS EC2 provider for ectools
//!
//! Implements `ComputeApi` on top of `aws-sdk-ec2`: one RunInstances,
//! DescribeInstances or TerminateInstances call per operation.
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the SDK default chain
//!   (`AWS_PROFILE`, `AWS_ACCESS_KEY_ID`, SSO, instance role, ...)
//! - An existing EC2 launch template to launch from
//!
//! # Example
//!
//! ```ignore
//! use ectools_cloud::{FleetManager, LaunchRequest};
//! use ectools_cloud_aws::{AwsOptions, Ec2Compute};
//!
//! let compute = Ec2Compute::from_env(&AwsOptions::default()).await;
//! let fleet = FleetManager::new(compute);
//!
//! let status = fleet.list_status().await?;
//! ```

mod convert;
mod error;
pub mod provider;
mod request;

pub use provider::{AwsOptions, Ec2Compute, load_sdk_config, shared_client};
