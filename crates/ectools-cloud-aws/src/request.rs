//! RunInstances / DescribeInstances request construction
//!
//! Overrides with a typed SDK setter go through the fluent builder. Every
//! other raw parameter is flattened into EC2 Query form (`Name.Member=value`,
//! `Name.N=value` for lists) and appended to the serialized request body, so
//! EC2 itself decides whether it is valid.

use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::http::{HttpRequest, HttpResponse};
use aws_sdk_ec2::error::SdkError;
use aws_sdk_ec2::operation::run_instances::builders::RunInstancesFluentBuilder;
use aws_sdk_ec2::operation::run_instances::{RunInstancesError, RunInstancesOutput};
use aws_sdk_ec2::types::{
    Filter, IamInstanceProfileSpecification, InstanceType, LaunchTemplateSpecification,
    ResourceType, ShutdownBehavior, Tag, TagSpecification,
};
use aws_smithy_types::body::SdkBody;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ectools_cloud::{FleetError, LaunchOverrides, Result, RunInstancesRequest, TagFilter};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::{debug, warn};

/// Query parameters ectools sets on every launch
const RESERVED_PARAMETERS: &[&str] = &[
    "Action",
    "Version",
    "LaunchTemplate",
    "MinCount",
    "MaxCount",
    "TagSpecification",
    "TagSpecifications",
];

/// API list names whose EC2 Query serialization uses the singular form
const QUERY_LIST_NAMES: &[(&str, &str)] = &[
    ("BlockDeviceMappings", "BlockDeviceMapping"),
    ("NetworkInterfaces", "NetworkInterface"),
    ("Ipv6Addresses", "Ipv6Address"),
    ("ElasticInferenceAccelerators", "ElasticInferenceAccelerator"),
    ("LicenseSpecifications", "LicenseSpecification"),
    ("SecurityGroupIds", "SecurityGroupId"),
    ("SecurityGroups", "SecurityGroup"),
];

/// RFC 3986 unreserved characters stay as-is; `.` keeps flattened names readable
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A RunInstances call ready to send
pub(crate) struct RunInstancesCall {
    pub(crate) builder: RunInstancesFluentBuilder,

    /// Flattened query parameters with no typed setter
    pub(crate) passthrough: Vec<(String, String)>,
}

impl RunInstancesCall {
    pub(crate) async fn send(
        self,
    ) -> std::result::Result<RunInstancesOutput, SdkError<RunInstancesError, HttpResponse>> {
        if self.passthrough.is_empty() {
            return self.builder.send().await;
        }

        debug!(params = ?self.passthrough, "Forwarding raw RunInstances parameters");
        let suffix = encode_query(&self.passthrough);
        self.builder
            .customize()
            .mutate_request(move |request| append_to_body(request, &suffix))
            .send()
            .await
    }
}

/// Build the RunInstances call for one launch
pub(crate) fn run_instances(
    client: &Client,
    request: &RunInstancesRequest,
) -> Result<RunInstancesCall> {
    let tags: Vec<Tag> = request
        .tags
        .iter()
        .map(|t| Tag::builder().key(&t.key).value(&t.value).build())
        .collect();

    let builder = client
        .run_instances()
        .launch_template(
            LaunchTemplateSpecification::builder()
                .launch_template_name(&request.template.name)
                .version(&request.template.version)
                .build(),
        )
        .min_count(to_count(request.min_count)?)
        .max_count(to_count(request.max_count)?)
        .tag_specifications(
            TagSpecification::builder()
                .resource_type(ResourceType::Instance)
                .set_tags(Some(tags))
                .build(),
        );

    apply_overrides(builder, &request.overrides)
}

/// Filter for DescribeInstances
pub(crate) fn tag_filter(filter: &TagFilter) -> Filter {
    Filter::builder()
        .name(filter.name())
        .set_values(Some(filter.values.clone()))
        .build()
}

fn to_count(count: u32) -> Result<i32> {
    i32::try_from(count)
        .map_err(|_| FleetError::InvalidRequest(format!("instance count {} is too large", count)))
}

/// EC2 expects user data base64-encoded
fn encode_user_data(user_data: &str) -> String {
    STANDARD.encode(user_data.as_bytes())
}

fn apply_overrides(
    mut builder: RunInstancesFluentBuilder,
    overrides: &LaunchOverrides,
) -> Result<RunInstancesCall> {
    if let Some(user_data) = &overrides.user_data {
        builder = builder.user_data(encode_user_data(user_data));
    }

    if let Some(instance_type) = &overrides.instance_type {
        builder = builder.instance_type(InstanceType::from(instance_type.as_str()));
    }

    if let Some(key_name) = &overrides.key_name {
        builder = builder.key_name(key_name);
    }

    if let Some(subnet_id) = &overrides.subnet_id {
        builder = builder.subnet_id(subnet_id);
    }

    for sg in &overrides.security_group_ids {
        builder = builder.security_group_ids(sg);
    }

    if let Some(profile) = &overrides.iam_instance_profile {
        builder = builder.iam_instance_profile(
            IamInstanceProfileSpecification::builder()
                .name(profile)
                .build(),
        );
    }

    let mut passthrough = Vec::new();
    for (name, value) in &overrides.extra_raw_parameters {
        if RESERVED_PARAMETERS.contains(&name.as_str()) {
            return Err(FleetError::InvalidOverride {
                name: name.clone(),
                reason: "set by ectools on every launch".to_string(),
            });
        }

        builder = match apply_typed(builder, name, value) {
            Ok(builder) => builder,
            Err(builder) => {
                flatten_query(query_name(name), value, &mut passthrough);
                builder
            }
        };
    }

    Ok(RunInstancesCall {
        builder,
        passthrough,
    })
}

/// Apply a parameter through its SDK setter.
///
/// Hands the builder back as `Err` when the name has no typed setter or the
/// value is not the JSON type the setter takes.
fn apply_typed(
    builder: RunInstancesFluentBuilder,
    name: &str,
    value: &Value,
) -> std::result::Result<RunInstancesFluentBuilder, RunInstancesFluentBuilder> {
    let applied = match (name, value) {
        ("UserData", Value::String(s)) => builder.user_data(encode_user_data(s)),
        ("ImageId", Value::String(s)) => builder.image_id(s),
        ("InstanceType", Value::String(s)) => builder.instance_type(InstanceType::from(s.as_str())),
        ("KeyName", Value::String(s)) => builder.key_name(s),
        ("SubnetId", Value::String(s)) => builder.subnet_id(s),
        ("PrivateIpAddress", Value::String(s)) => builder.private_ip_address(s),
        ("ClientToken", Value::String(s)) => builder.client_token(s),
        ("InstanceInitiatedShutdownBehavior", Value::String(s)) => {
            builder.instance_initiated_shutdown_behavior(ShutdownBehavior::from(s.as_str()))
        }
        ("EbsOptimized", Value::Bool(b)) => builder.ebs_optimized(*b),
        ("DisableApiTermination", Value::Bool(b)) => builder.disable_api_termination(*b),
        ("DisableApiStop", Value::Bool(b)) => builder.disable_api_stop(*b),
        ("SecurityGroupIds", Value::Array(items)) => match string_items(items) {
            Some(ids) => ids.into_iter().fold(builder, |b, id| b.security_group_ids(id)),
            None => return Err(builder),
        },
        ("SecurityGroups", Value::Array(items)) => match string_items(items) {
            Some(groups) => groups
                .into_iter()
                .fold(builder, |b, group| b.security_groups(group)),
            None => return Err(builder),
        },
        _ => return Err(builder),
    };
    Ok(applied)
}

fn string_items(items: &[Value]) -> Option<Vec<&str>> {
    items.iter().map(Value::as_str).collect()
}

fn query_name(name: &str) -> &str {
    QUERY_LIST_NAMES
        .iter()
        .find(|(api, _)| *api == name)
        .map_or(name, |&(_, query)| query)
}

/// Flatten a JSON value into EC2 Query parameters
fn flatten_query(name: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((name.to_string(), b.to_string())),
        Value::Number(n) => out.push((name.to_string(), n.to_string())),
        Value::String(s) => out.push((name.to_string(), s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_query(&format!("{}.{}", name, i + 1), item, out);
            }
        }
        Value::Object(members) => {
            for (key, member) in members {
                flatten_query(&format!("{}.{}", name, key), member, out);
            }
        }
    }
}

/// `&k=v` pairs, form-encoded
fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "&{}={}",
                utf8_percent_encode(k, QUERY_ENCODE),
                utf8_percent_encode(v, QUERY_ENCODE)
            )
        })
        .collect()
}

fn append_to_body(request: &mut HttpRequest, suffix: &str) {
    let Some(body) = request.body().bytes() else {
        warn!("RunInstances body is streaming; raw parameters not forwarded");
        return;
    };

    let mut bytes = body.to_vec();
    bytes.extend_from_slice(suffix.as_bytes());
    let len = bytes.len();

    *request.body_mut() = SdkBody::from(bytes);
    request.headers_mut().insert("content-length", len.to_string());
}
