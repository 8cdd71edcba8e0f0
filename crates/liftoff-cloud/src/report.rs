//! Run report

use crate::error::CloudError;
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// Outcome of one orchestrator run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Steps that completed
    pub succeeded: Vec<StepResult>,

    /// Steps that failed
    pub failed: Vec<StepResult>,

    /// Tokens that did not name a resource kind
    pub skipped: Vec<String>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    /// Exit code of the first failed step
    #[serde(skip)]
    first_failure_code: Option<i32>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, kind: ResourceKind, message: String) {
        self.succeeded.push(StepResult {
            kind,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, kind: ResourceKind, error: &CloudError) {
        self.first_failure_code.get_or_insert(error.exit_code());
        self.failed.push(StepResult {
            kind,
            success: false,
            message: String::new(),
            error: Some(error.to_string()),
        });
    }

    pub fn add_skipped(&mut self, token: String) {
        self.skipped.push(token);
    }

    /// Process exit code: 0 when every step succeeded, otherwise the code of
    /// the first failed step.
    pub fn exit_code(&self) -> i32 {
        self.first_failure_code.unwrap_or(0)
    }
}

/// Result of a single provisioning step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Resource kind the step acted on
    pub kind: ResourceKind,

    /// Whether the step succeeded
    pub success: bool,

    /// Success message
    pub message: String,

    /// Error message if failed
    pub error: Option<String>,
}
