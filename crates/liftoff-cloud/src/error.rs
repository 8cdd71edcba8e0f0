//! Provisioning error types

use thiserror::Error;

/// Provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{what} '{name}' not found")]
    NotFound { what: String, name: String },

    #[error("Resource not found: {0}")]
    ResourceMissing(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Dependency not yet usable (propagation delay): {0}")]
    PropagationDelay(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error(
        "Fleet capacity exceeded: {0}\n\nHint:\n  • Wait for capacity to free up and run the fleet step again\n  • Or pick a different instance type with --fleet-instance-type"
    )]
    CapacityExceeded(String),

    #[error(
        "Service limit exceeded: {0}\n\nHint:\n  • An existing fleet probably counts against the limit; remove it first: liftoff delete fleet\n  • Or request a limit increase for the account"
    )]
    LimitExceeded(String),

    #[error(
        "{what} '{id}' did not become {target} after {attempts} polls\n\nHint:\n  • Check the resource in the AWS console\n  • Raise the ceiling with --poll-max-attempts"
    )]
    Timeout {
        what: String,
        id: String,
        target: String,
        attempts: u32,
    },

    #[error("{what} '{id}' entered terminal state {state}")]
    ResourceFailed {
        what: String,
        id: String,
        state: String,
    },

    #[error("{what} still failing after {attempts} attempts: {source}")]
    RetriesExhausted {
        what: String,
        attempts: u32,
        #[source]
        source: Box<CloudError>,
    },

    #[error("Build upload did not report a build id: {stderr}")]
    BuildIdMissing { stderr: String },

    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes the orchestrator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A dependency or target does not exist under the expected name
    NotFound,
    /// A freshly created dependency is not usable yet; retry locally
    Transient,
    /// The target already exists; callers treat this as success
    Conflict,
    /// Quota or capacity exceeded; reported, never retried
    ProviderLimit,
    /// A readiness poll hit its ceiling
    Timeout,
    /// Everything else
    Fatal,
}

impl CloudError {
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        CloudError::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CloudError::NotFound { .. } | CloudError::ResourceMissing(_) => ErrorClass::NotFound,
            CloudError::PropagationDelay(_) | CloudError::Throttled(_) => ErrorClass::Transient,
            CloudError::AlreadyExists(_) => ErrorClass::Conflict,
            CloudError::CapacityExceeded(_) | CloudError::LimitExceeded(_) => {
                ErrorClass::ProviderLimit
            }
            CloudError::Timeout { .. } => ErrorClass::Timeout,
            _ => ErrorClass::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Process exit code for a run whose first failure is this error.
    pub fn exit_code(&self) -> i32 {
        if matches!(self, CloudError::RetriesExhausted { .. }) {
            return 6;
        }
        match self.class() {
            ErrorClass::NotFound => 3,
            ErrorClass::ProviderLimit => 4,
            ErrorClass::Timeout => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
