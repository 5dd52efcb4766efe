//! SDK error conversion
//!
//! Uses the SDK's error metadata (`.code()` / `.message()`) so the remote
//! error reaches the caller exactly as EC2 reported it.

use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use ectools_cloud::ComputeError;

/// Wrap an SDK error without altering its code or message
pub(crate) fn compute_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> ComputeError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    ComputeError::new(operation, code, message).with_source(err)
}
