//! Fleet data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// One instance as observed by `list_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_id: String,

    /// Value of the `group` tag, if the instance has one
    pub group_name: Option<String>,

    /// Public IP address, once allocated
    pub ip: Option<String>,

    /// True iff the provider reports the instance as running
    pub ready: bool,
}

/// Parameters for one `launch` call
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Name of an existing launch template
    pub template_name: String,

    /// Exact number of instances to create
    pub count: NonZeroU32,

    /// Group tag value; generated when `None`
    pub group_name: Option<String>,

    pub overrides: LaunchOverrides,
}

impl LaunchRequest {
    pub fn new(template_name: impl Into<String>, count: NonZeroU32) -> Self {
        Self {
            template_name: template_name.into(),
            count,
            group_name: None,
            overrides: LaunchOverrides::default(),
        }
    }

    /// Set the group name
    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Replace the launch overrides
    pub fn with_overrides(mut self, overrides: LaunchOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Launch parameters that override the template.
///
/// Common fields are typed. Anything else goes into `extra_raw_parameters`,
/// keyed by the provider's own parameter name (e.g. `"EbsOptimized"`) and
/// forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchOverrides {
    /// Boot script, plain text
    pub user_data: Option<String>,

    pub instance_type: Option<String>,

    pub key_name: Option<String>,

    pub subnet_id: Option<String>,

    #[serde(default)]
    pub security_group_ids: Vec<String>,

    /// Instance profile name
    pub iam_instance_profile: Option<String>,

    #[serde(default)]
    pub extra_raw_parameters: BTreeMap<String, serde_json::Value>,
}

impl LaunchOverrides {
    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    pub fn with_raw_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_raw_parameters.insert(name.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_request_builder() {
        let request = LaunchRequest::new("devserver", NonZeroU32::new(3).unwrap())
            .with_group("my-group")
            .with_overrides(LaunchOverrides::default().with_user_data("#!/bin/sh\necho hi\n"));

        assert_eq!(request.template_name, "devserver");
        assert_eq!(request.count.get(), 3);
        assert_eq!(request.group_name.as_deref(), Some("my-group"));
        assert_eq!(
            request.overrides.user_data.as_deref(),
            Some("#!/bin/sh\necho hi\n")
        );
    }

    #[test]
    fn test_overrides_is_empty() {
        assert!(LaunchOverrides::default().is_empty());
        assert!(
            !LaunchOverrides::default()
                .with_raw_parameter("EbsOptimized", serde_json::json!(true))
                .is_empty()
        );
    }

    #[test]
    fn test_instance_record_json() {
        let record = InstanceRecord {
            instance_id: "i-0abc".to_string(),
            group_name: None,
            ip: None,
            ready: false,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "instance_id": "i-0abc",
                "group_name": null,
                "ip": null,
                "ready": false,
            })
        );
    }
}
