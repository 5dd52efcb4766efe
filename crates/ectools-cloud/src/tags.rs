//! Tag schema for ectools-managed instances
//!
//! | Tag Key   | Value                         |
//! |-----------|-------------------------------|
//! | `ectools` | `1` on every launched instance |
//! | `group`   | group name given at launch    |
//!
//! The marker tag is the only thing `list_status` filters on. The group tag is
//! descriptive: not unique, not validated.

use crate::provider::{Tag, TagFilter};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Tag key marking an instance as managed by ectools
pub const TAG_MARKER: &str = "ectools";

/// Tag value for the marker tag
pub const TAG_MARKER_VALUE: &str = "1";

/// Tag key carrying the group name
pub const TAG_GROUP: &str = "group";

/// Length of generated group names
pub const GROUP_NAME_LEN: usize = 5;

/// Tags applied to every instance of one launch
pub fn launch_tags(group_name: &str) -> Vec<Tag> {
    vec![
        Tag::new(TAG_MARKER, TAG_MARKER_VALUE),
        Tag::new(TAG_GROUP, group_name),
    ]
}

/// Filter selecting every ectools-managed instance
pub fn marker_filter() -> TagFilter {
    TagFilter::new(TAG_MARKER, TAG_MARKER_VALUE)
}

/// Random group name drawn from `[A-Za-z0-9]`.
///
/// Not cryptographically secure and collisions are possible; groups are labels,
/// not keys.
pub fn random_group_name() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GROUP_NAME_LEN)
        .map(char::from)
        .collect()
}

/// Use the caller's group name, or generate one
pub fn resolve_group_name(group_name: Option<String>) -> String {
    group_name.unwrap_or_else(random_group_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_group_name_shape() {
        for _ in 0..200 {
            let name = random_group_name();
            assert_eq!(name.len(), GROUP_NAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric()), "{name}");
        }
    }

    #[test]
    fn test_resolve_keeps_supplied_name() {
        assert_eq!(resolve_group_name(Some("my-group".to_string())), "my-group");
        // Not validated: empty names pass through
        assert_eq!(resolve_group_name(Some(String::new())), "");
    }

    #[test]
    fn test_launch_tags() {
        let tags = launch_tags("fetch-workers");

        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Tag::new("ectools", "1")));
        assert_eq!(
            tags.iter().filter(|t| t.key == TAG_GROUP).count(),
            1,
            "exactly one group tag"
        );
        assert!(tags.contains(&Tag::new("group", "fetch-workers")));
    }

    #[test]
    fn test_marker_filter() {
        let filter = marker_filter();
        assert_eq!(filter.name(), "tag:ectools");
        assert_eq!(filter.values, vec!["1".to_string()]);
    }
}
