//! aws CLI wrapper
//!
//! Every call runs `aws <service> <operation> ... --profile <p> --region <r>
//! --output json` and parses stdout.

use crate::error::{AwsError, Result};
use crate::models::CallerIdentity;
use liftoff_cloud::ToolOutput;
use serde::de::DeserializeOwned;
use std::process::Stdio;
use tokio::process::Command;

/// aws CLI wrapper bound to one profile and region
#[derive(Debug, Clone)]
pub struct AwsCli {
    profile: String,
    region: String,
}

impl AwsCli {
    pub fn new(profile: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Check that the aws CLI is installed and the profile resolves to an identity
    pub async fn check_auth(&self) -> Result<CallerIdentity> {
        let which = Command::new("which").arg("aws").output().await?;
        if !which.status.success() {
            return Err(AwsError::CliNotFound);
        }

        self.caller_identity().await.map_err(|e| match e {
            AwsError::CommandFailed(msg) => AwsError::AuthenticationFailed(msg),
            other => other,
        })
    }

    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        self.run_json(&["sts", "get-caller-identity"]).await
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("aws");
        cmd.args(args);
        cmd.arg("--profile").arg(&self.profile);
        cmd.arg("--region").arg(&self.region);
        cmd.env("AWS_PAGER", "");
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: aws {} --profile {} --region {}",
            args.join(" "),
            self.profile,
            self.region
        );
        cmd
    }

    /// Run an aws command with JSON output and return stdout
    pub async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = self.command(args);
        cmd.arg("--output").arg("json");

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AwsError::from_stderr(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run an aws command and parse its JSON output
    pub async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run_command(args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Run an aws command and hand back its text output whatever the exit status
    pub async fn run_raw(&self, args: &[&str]) -> Result<ToolOutput> {
        let output = self.command(args).output().await?;

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run an aws command for its side effect only
    pub async fn run_unit(&self, args: &[&str]) -> Result<()> {
        self.run_command(args).await?;
        Ok(())
    }
}

/// Pagination arguments for a CLI-paginated listing.
pub fn page_args<'a>(page_size: &'a str, next_token: Option<&'a str>) -> Vec<&'a str> {
    let mut args = vec!["--max-items", page_size];
    if let Some(token) = next_token {
        args.push("--starting-token");
        args.push(token);
    }
    args
}
