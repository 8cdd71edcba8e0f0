//! Build provisioner

use super::{ProvisionContext, Provisioner};
use crate::error::{CloudError, Result};
use crate::provider::BuildUpload;
use crate::resource::ResourceKind;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// Extract the id from the upload tool's `Build ID: <value>` line.
pub fn parse_build_id(output: &str) -> Result<Option<String>> {
    let re = Regex::new(r"Build ID: (\S+)")
        .map_err(|e| CloudError::InvalidConfig(format!("build id pattern: {}", e)))?;
    Ok(re.captures(output).map(|caps| caps[1].to_string()))
}

/// Uploads the server build. Every create issues a fresh upload.
pub struct BuildProvisioner {
    ctx: Arc<ProvisionContext>,
}

impl BuildProvisioner {
    pub fn new(ctx: Arc<ProvisionContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Provisioner for BuildProvisioner {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Build
    }

    async fn create(&self) -> Result<String> {
        let config = &self.ctx.config;
        info!(
            "Uploading build {} ({}) from {}",
            config.build_name, config.build_version, config.build_root
        );

        let output = self
            .ctx
            .clients
            .fleets
            .upload_build(&BuildUpload {
                name: config.build_name.clone(),
                version: config.build_version.clone(),
                operating_system: config.build_os.clone(),
                root: config.build_root.clone(),
            })
            .await?;

        match parse_build_id(&output.stdout)? {
            Some(build_id) => {
                info!("Uploaded build {}: {}", config.build_name, build_id);
                Ok(format!("uploaded {} ({})", config.build_name, build_id))
            }
            None => {
                error!("Build upload failed:\n{}", output.stderr);
                Err(CloudError::BuildIdMissing {
                    stderr: output.stderr,
                })
            }
        }
    }

    async fn delete(&self) -> Result<String> {
        let name = &self.ctx.config.build_name;
        let locator = self.ctx.locator();
        let mut deleted = HashSet::new();

        // Removed ids are skipped so a stale listing cannot hide later duplicates
        while let Some(build_id) = locator.build_id_excluding(name, &deleted).await? {
            info!("Deleting build {} ({})", name, build_id);
            self.ctx.clients.fleets.delete_build(&build_id).await?;
            deleted.insert(build_id);
        }

        if deleted.is_empty() {
            info!("Build {} not found, nothing to delete", name);
            return Ok(format!("{} not found", name));
        }
        Ok(format!("deleted {} build(s) named {}", deleted.len(), name))
    }
}
