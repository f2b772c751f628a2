//! Error types for SNS notifications.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SNS error: {0}")]
    Sns(#[from] aws_sdk_sns::Error),

    #[error("Failed to build request: {0}")]
    Build(#[from] aws_sdk_sns::error::BuildError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}
