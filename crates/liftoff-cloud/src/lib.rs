//! Liftoff Cloud Provisioning
//!
//! This crate holds the provider-neutral provisioning engine for Liftoff:
//! it creates and tears down the fixed game backend topology (server build,
//! fleet, user pool, function pair, REST API) by name, idempotently.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Liftoff CLI                     │
//! │          (liftoff create|delete <kinds>)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                liftoff-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │           Stage Orchestrator             │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───────────────────────┐   │
//! │  │  Provisioners (build, fleet, user_pool,  │   │
//! │  │           lambdas, rest_api)             │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌─────────┐  ┌─────▼────┐  ┌──────────┐        │
//! │  │ Locator │  │  Poller  │  │  Retry   │        │
//! │  └─────────┘  └──────────┘  └──────────┘        │
//! │  trait FleetApi / IdentityPoolApi /             │
//! │        FunctionApi / GatewayApi                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │ liftoff-cloud- │
//!           │      aws       │
//!           └────────────────┘
//! ```

pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod package;
pub mod poller;
pub mod provider;
pub mod provision;
pub mod report;
pub mod resource;
pub mod retry;

// Re-exports
pub use error::{CloudError, ErrorClass, Result};
pub use locator::ResourceLocator;
pub use orchestrator::{Selector, StageOrchestrator, Verb, parse_selectors};
pub use poller::{PollConfig, ReadinessPoller};
pub use provider::{
    AuthStatus, FleetApi, FunctionApi, GatewayApi, IdentityPoolApi, ProviderClients, ToolOutput,
};
pub use provision::{ProvisionContext, Provisioner, provisioner};
pub use report::{RunReport, StepResult};
pub use resource::{NamedResource, Page, ResourceHandle, ResourceKind};
pub use retry::RetryConfig;
