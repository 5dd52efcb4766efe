//! ectools Cloud Core
//!
//! Launch tagged groups of instances from a launch template, poll their
//! status, and terminate them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  ectools CLI                     │
//! │         (launch / status / terminate)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                ectools-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │            FleetManager<C>                │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ComputeApi { run / describe /     │   │
//! │  │                     terminate }           │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │   aws-ec2     │
//!           │   provider    │
//!           └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ectools_cloud::{FleetManager, LaunchRequest};
//! use std::num::NonZeroU32;
//!
//! let fleet = FleetManager::new(client);
//! let ids = fleet
//!     .launch(LaunchRequest::new("devserver", NonZeroU32::new(2).unwrap()).with_group("my-group"))
//!     .await?;
//!
//! for record in fleet.list_status().await? {
//!     println!("{} ready={}", record.instance_id, record.ready);
//! }
//!
//! fleet.terminate(&ids).await?;
//! ```

pub mod error;
pub mod fleet;
pub mod model;
pub mod provider;
pub mod tags;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use error::{ComputeError, FleetError, Result};
pub use fleet::FleetManager;
pub use model::{InstanceRecord, LaunchOverrides, LaunchRequest};
pub use provider::{
    ComputeApi, InstanceState, LaunchTemplateRef, RemoteInstance, Reservation,
    RunInstancesRequest, Tag, TagFilter,
};
