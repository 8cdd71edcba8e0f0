//! Resource provisioners
//!
//! One provisioner per [`ResourceKind`]. Provisioners hold nothing but the
//! shared [`ProvisionContext`]; every dependency id is re-resolved by name
//! right before it is used.

mod build;
mod fleet;
mod functions;
mod gateway;
mod identity_pool;

pub use build::{BuildProvisioner, parse_build_id};
pub use fleet::{BUILD_FAILED, BUILD_READY, FleetProvisioner};
pub use functions::{
    FunctionPairProvisioner, SESSION_ACTIONS, login_policy, session_policy, trust_policy,
};
pub use gateway::{GatewayProvisioner, invoke_url, statement_id};
pub use identity_pool::{
    IdentityPoolProvisioner, TEST_PASSWORD, TEST_USER_COUNT, hosted_login_url, test_users,
};

use crate::error::{ErrorClass, Result};
use crate::locator::ResourceLocator;
use crate::poller::{PollConfig, ReadinessPoller};
use crate::provider::ProviderClients;
use crate::resource::ResourceKind;
use crate::retry::RetryConfig;
use async_trait::async_trait;
use liftoff_config::StageConfig;
use std::sync::Arc;

/// Everything a provisioner needs: configuration, provider handles and timing.
pub struct ProvisionContext {
    pub config: StageConfig,
    pub clients: ProviderClients,
    pub poll: PollConfig,
    pub retry: RetryConfig,
}

impl ProvisionContext {
    pub fn new(config: StageConfig, clients: ProviderClients) -> Self {
        Self {
            config,
            clients,
            poll: PollConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn locator(&self) -> ResourceLocator {
        ResourceLocator::new(self.clients.clone())
    }

    pub fn poller(&self) -> ReadinessPoller {
        ReadinessPoller::new(self.poll)
    }
}

/// Create and delete one resource kind.
///
/// Both operations return a short human-readable summary on success.
#[async_trait]
pub trait Provisioner: Send + Sync {
    fn kind(&self) -> ResourceKind;

    async fn create(&self) -> Result<String>;

    async fn delete(&self) -> Result<String>;
}

/// Provisioner for `kind`.
pub fn provisioner(kind: ResourceKind, ctx: Arc<ProvisionContext>) -> Box<dyn Provisioner> {
    match kind {
        ResourceKind::Build => Box::new(BuildProvisioner::new(ctx)),
        ResourceKind::Fleet => Box::new(FleetProvisioner::new(ctx)),
        ResourceKind::UserPool => Box::new(IdentityPoolProvisioner::new(ctx)),
        ResourceKind::Lambdas => Box::new(FunctionPairProvisioner::new(ctx)),
        ResourceKind::RestApi => Box::new(GatewayProvisioner::new(ctx)),
    }
}

/// Treat a NotFound-class failure of a cleanup sub-step as done.
pub(crate) fn ignore_missing(what: &str, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.class() == ErrorClass::NotFound => {
            tracing::warn!("{} already gone: {}", what, e);
            Ok(())
        }
        other => other,
    }
}
