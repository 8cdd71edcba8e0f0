//! Fleet provisioner

use super::{ProvisionContext, Provisioner};
use crate::error::{ErrorClass, Result};
use crate::locator::require;
use crate::provider::FleetRequest;
use crate::resource::ResourceKind;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Build state required before a fleet may use it
pub const BUILD_READY: &str = "READY";

/// Build state that will never become ready
pub const BUILD_FAILED: &str = "FAILED";

/// Creates the compute fleet once its build is ready.
pub struct FleetProvisioner {
    ctx: Arc<ProvisionContext>,
}

impl FleetProvisioner {
    pub fn new(ctx: Arc<ProvisionContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Provisioner for FleetProvisioner {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Fleet
    }

    async fn create(&self) -> Result<String> {
        let config = &self.ctx.config;
        let locator = self.ctx.locator();

        if let Some(fleet_id) = locator.fleet_id(&config.fleet_name).await? {
            info!("Fleet {} already exists: {}", config.fleet_name, fleet_id);
            return Ok(format!("{} already exists ({})", config.fleet_name, fleet_id));
        }

        let build_id = require(
            "build",
            &config.build_name,
            locator.build_id(&config.build_name).await?,
        )?;

        info!("Waiting for build {} to become {}", build_id, BUILD_READY);
        let fleets = &self.ctx.clients.fleets;
        let build = build_id.as_str();
        let polls = self
            .ctx
            .poller()
            .await_ready("build", build, BUILD_READY, &[BUILD_FAILED], move || {
                fleets.build_status(build)
            })
            .await?;
        info!("Build {} ready after {} poll(s)", build_id, polls);

        let request = FleetRequest {
            name: config.fleet_name.clone(),
            build_id,
            launch_path: config.fleet_launch_path.clone(),
            instance_type: config.fleet_instance_type.clone(),
            session_port: config.fleet_session_port,
        };
        info!(
            "Creating fleet {} ({}, UDP {})",
            request.name, request.instance_type, request.session_port
        );

        match fleets.create_fleet(&request).await {
            Ok(fleet_id) => {
                info!("Created fleet {}: {}", request.name, fleet_id);
                Ok(format!("created {} ({})", request.name, fleet_id))
            }
            Err(e) => {
                if e.class() == ErrorClass::ProviderLimit {
                    error!("Fleet {} hit a provider limit:\n{}", request.name, e);
                }
                Err(e)
            }
        }
    }

    async fn delete(&self) -> Result<String> {
        let name = &self.ctx.config.fleet_name;
        match self.ctx.locator().fleet_id(name).await? {
            Some(fleet_id) => {
                info!("Deleting fleet {} ({})", name, fleet_id);
                self.ctx.clients.fleets.delete_fleet(&fleet_id).await?;
                Ok(format!("deleted {} ({})", name, fleet_id))
            }
            None => {
                info!("Fleet {} not found, nothing to delete", name);
                Ok(format!("{} not found", name))
            }
        }
    }
}
