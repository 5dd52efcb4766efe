//! Fleet error types

use thiserror::Error;

/// Error codes the provider uses for ids or templates that do not exist
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidInstanceID.NotFound",
    "InvalidInstanceID.Malformed",
    "InvalidLaunchTemplateName.NotFoundException",
    "InvalidLaunchTemplateId.NotFound",
];

/// A failure reported by the remote compute service.
///
/// `code` and `message` are carried exactly as the service returned them;
/// the original client error stays reachable through `source()`.
#[derive(Error, Debug)]
#[error("{operation} failed ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
pub struct ComputeError {
    /// Remote operation name (e.g., "RunInstances")
    pub operation: &'static str,

    /// Remote error code, if the service sent one
    pub code: Option<String>,

    /// Remote error message
    pub message: String,

    /// Underlying client error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ComputeError {
    pub fn new(
        operation: &'static str,
        code: Option<impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            code: code.map(Into::into),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Check whether the remote rejected an unknown instance id or template
    pub fn is_not_found(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|c| NOT_FOUND_CODES.contains(&c))
    }
}

/// Fleet manager errors
#[derive(Error, Debug)]
pub enum FleetError {
    #[error(transparent)]
    Remote(#[from] ComputeError),

    #[error("Invalid override parameter '{name}': {reason}")]
    InvalidOverride { name: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FleetError {
    pub fn is_not_found(&self) -> bool {
        match self {
            FleetError::Remote(e) => e.is_not_found(),
            FleetError::InvalidOverride { .. } | FleetError::InvalidRequest(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_remote_code_and_message() {
        let err = ComputeError::new(
            "TerminateInstances",
            Some("InvalidInstanceID.NotFound"),
            "The instance ID 'i-doesnotexist' does not exist",
        );

        assert_eq!(
            err.to_string(),
            "TerminateInstances failed (InvalidInstanceID.NotFound): \
             The instance ID 'i-doesnotexist' does not exist"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_display_without_code() {
        let err = ComputeError::new("DescribeInstances", None::<String>, "dispatch failure");
        assert_eq!(
            err.to_string(),
            "DescribeInstances failed (no error code): dispatch failure"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_fleet_error_is_transparent() {
        let remote = ComputeError::new("RunInstances", Some("InstanceLimitExceeded"), "quota");
        let expected = remote.to_string();
        let err: FleetError = remote.into();

        assert_eq!(err.to_string(), expected);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout");
        let err = ComputeError::new("RunInstances", None::<String>, "timed out").with_source(io);

        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("socket timeout"));
    }
}
