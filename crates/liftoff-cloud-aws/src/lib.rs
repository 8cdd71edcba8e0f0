//! AWS provider for Liftoff
//!
//! This crate implements the Liftoff provider traits on top of the `aws`
//! CLI, covering GameLift builds and fleets, Cognito user pools, IAM roles,
//! Lambda functions and API Gateway REST APIs.
//!
//! # Requirements
//!
//! - AWS CLI v2 must be installed (`aws` on `PATH`)
//! - Credentials are resolved through the named profile (`aws configure --profile <name>`)
//!
//! # Example
//!
//! ```ignore
//! use liftoff_cloud::{ProvisionContext, StageOrchestrator, Verb};
//! use liftoff_cloud_aws::AwsProvider;
//!
//! let provider = AwsProvider::new("default", "us-west-2");
//!
//! let auth = provider.check_auth().await;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let ctx = ProvisionContext::new(config, provider.into_clients());
//! let report = StageOrchestrator::new(ctx).run(Verb::Create, &["all"]).await;
//! ```

pub mod cli;
pub mod error;
pub mod models;
pub mod provider;

pub use cli::AwsCli;
pub use error::{AwsError, Result};
pub use provider::AwsProvider;
