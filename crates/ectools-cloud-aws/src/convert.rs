//! EC2 response model → ectools provider model

use aws_sdk_ec2::types::{Instance, Reservation as Ec2Reservation};
use ectools_cloud::{InstanceState, RemoteInstance, Reservation};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::warn;

pub(crate) fn reservation(reservation: &Ec2Reservation) -> Reservation {
    Reservation {
        instances: reservation.instances().iter().map(remote_instance).collect(),
    }
}

/// Convert one described instance.
///
/// Tags become a map; if a key appears twice the first value wins.
pub(crate) fn remote_instance(instance: &Instance) -> RemoteInstance {
    let instance_id = instance.instance_id().unwrap_or_default().to_string();

    let mut tags = BTreeMap::new();
    for tag in instance.tags() {
        let Some(key) = tag.key() else {
            continue;
        };
        let value = tag.value().unwrap_or_default();
        match tags.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
            }
            Entry::Occupied(kept) => {
                warn!(
                    instance_id = %instance_id,
                    key = %key,
                    kept = %kept.get(),
                    ignored = %value,
                    "Duplicate tag key on instance"
                );
            }
        }
    }

    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|name| InstanceState::from_name(name.as_str()))
        .unwrap_or_else(|| InstanceState::Other("unknown".to_string()));

    RemoteInstance {
        instance_id,
        public_ip: instance.public_ip_address().map(str::to_string),
        state,
        tags,
    }
}
