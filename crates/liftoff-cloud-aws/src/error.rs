//! AWS provider error types

use liftoff_cloud::CloudError;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error(
        "aws CLI not found\n\nHint:\n  • Install AWS CLI v2: https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html\n  • Then configure credentials: aws configure --profile <profile>"
    )]
    CliNotFound,

    #[error("aws authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    /// Service error reported by the CLI as `An error occurred (<Code>)`
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("Unexpected aws output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AwsError {
    /// Classify a failed CLI run by its stderr.
    pub fn from_stderr(stderr: &str) -> Self {
        let service = Regex::new(r"An error occurred \((\w+)\)(?: when calling the \w+ operation)?[^:]*: (.*)")
            .ok()
            .and_then(|re| {
                re.captures(stderr)
                    .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
            });

        match service {
            Some((code, message)) => AwsError::Service { code, message },
            None => AwsError::CommandFailed(stderr.trim().to_string()),
        }
    }

    /// Service error code, if the CLI reported one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::Service { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.code(),
            Some("ResourceNotFoundException" | "NoSuchEntity" | "NotFoundException")
        )
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Service { code, message } => classify(&code, &message),
            AwsError::AuthenticationFailed(e) => CloudError::AuthenticationFailed(e),
            AwsError::IoError(e) => CloudError::Io(e),
            e @ (AwsError::CliNotFound | AwsError::CommandFailed(_)) => {
                CloudError::CommandFailed(e.to_string())
            }
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

fn classify(code: &str, message: &str) -> CloudError {
    let detail = format!("{}: {}", code, message);
    match code {
        "ResourceNotFoundException" | "NoSuchEntity" | "NotFoundException" => {
            CloudError::ResourceMissing(detail)
        }
        // Lambda rejects a role it cannot assume yet with this code
        "InvalidParameterValueException" if message.contains("role") => {
            CloudError::PropagationDelay(detail)
        }
        "ResourceConflictException" | "EntityAlreadyExists" | "ConflictException" => {
            CloudError::AlreadyExists(detail)
        }
        "FleetCapacityExceededException" => CloudError::CapacityExceeded(detail),
        "LimitExceededException" => CloudError::LimitExceeded(detail),
        "TooManyRequestsException" | "Throttling" | "ThrottlingException" => {
            CloudError::Throttled(detail)
        }
        "UnrecognizedClientException" | "InvalidClientTokenId" | "ExpiredToken" => {
            CloudError::AuthenticationFailed(detail)
        }
        _ => CloudError::ApiError(detail),
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
