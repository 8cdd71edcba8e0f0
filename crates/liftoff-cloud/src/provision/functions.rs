//! Function pair provisioner
//!
//! Two functions, each with its own execution role scoped to exactly the
//! policy it needs:
//! - start-session: game session actions, packaged with the fleet id
//! - login: password auth against the pool, packaged with the client id

use super::{ProvisionContext, Provisioner, ignore_missing};
use crate::error::{ErrorClass, Result};
use crate::locator::require;
use crate::package::{self, HANDLER_ENTRY, LOGIN_TEMPLATE, START_SESSION_TEMPLATE, Substitution};
use crate::provider::FunctionRequest;
use crate::resource::ResourceKind;
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Actions granted to the start-session function
pub const SESSION_ACTIONS: [&str; 8] = [
    "gamelift:CreateGameSession",
    "gamelift:CreatePlayerSession",
    "gamelift:CreatePlayerSessions",
    "gamelift:DescribeGameSessionDetails",
    "gamelift:DescribeGameSessions",
    "gamelift:ListFleets",
    "gamelift:ListGameServerGroups",
    "gamelift:SearchGameSessions",
];

/// Lets the function service assume the execution role.
pub fn trust_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "lambda.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

pub fn session_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": SESSION_ACTIONS,
            "Resource": "*"
        }]
    })
    .to_string()
}

pub fn login_policy() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": "cognito-idp:InitiateAuth",
            "Resource": "*"
        }]
    })
    .to_string()
}

/// What it takes to deploy one function of the pair
struct FunctionSpec<'a> {
    name: &'a str,
    role: &'a str,
    policy_name: &'a str,
    policy: String,
    template_path: Option<&'a Path>,
    embedded: &'static str,
    substitution: Substitution,
}

pub struct FunctionPairProvisioner {
    ctx: Arc<ProvisionContext>,
}

impl FunctionPairProvisioner {
    pub fn new(ctx: Arc<ProvisionContext>) -> Self {
        Self { ctx }
    }

    async fn session_spec(&self) -> Result<FunctionSpec<'_>> {
        let config = &self.ctx.config;
        let fleet_id = require(
            "fleet",
            &config.fleet_name,
            self.ctx.locator().fleet_id(&config.fleet_name).await?,
        )?;

        Ok(FunctionSpec {
            name: &config.lambda_start_session_name,
            role: &config.lambda_session_role,
            policy_name: &config.lambda_session_policy,
            policy: session_policy(),
            template_path: config.session_source.as_deref(),
            embedded: START_SESSION_TEMPLATE,
            substitution: Substitution::fleet_id(&fleet_id),
        })
    }

    async fn login_spec(&self) -> Result<FunctionSpec<'_>> {
        let config = &self.ctx.config;
        let client_id = require(
            "user pool client",
            &config.user_pool_client_name,
            self.ctx
                .locator()
                .app_client_id(&config.user_pool_name, &config.user_pool_client_name)
                .await?,
        )?;

        Ok(FunctionSpec {
            name: &config.lambda_login_name,
            role: &config.lambda_login_role,
            policy_name: &config.lambda_login_policy,
            policy: login_policy(),
            template_path: config.login_source.as_deref(),
            embedded: LOGIN_TEMPLATE,
            substitution: Substitution::client_id(&client_id),
        })
    }

    /// Reuse or create the execution role, then (re)attach its inline policy.
    async fn ensure_role(&self, spec: &FunctionSpec<'_>) -> Result<String> {
        let functions = &self.ctx.clients.functions;

        let role_arn = match self.ctx.locator().role_arn(spec.role).await? {
            Some(arn) => {
                info!("Role {} already exists: {}", spec.role, arn);
                arn
            }
            None => {
                info!("Creating role {}", spec.role);
                functions.create_role(spec.role, &trust_policy()).await?
            }
        };

        functions
            .put_role_policy(spec.role, spec.policy_name, &spec.policy)
            .await?;
        Ok(role_arn)
    }

    async fn deploy(&self, spec: FunctionSpec<'_>) -> Result<String> {
        let role_arn = self.ensure_role(&spec).await?;

        let template = package::load_template(spec.template_path, spec.embedded).await?;
        let request = FunctionRequest {
            name: spec.name.to_string(),
            role_arn,
            runtime: self.ctx.config.lambda_runtime.clone(),
            handler: HANDLER_ENTRY.to_string(),
            package: package::package(&template, &spec.substitution)?,
        };

        info!("Creating function {}", request.name);
        let functions = &self.ctx.clients.functions;
        let what = format!("create function {}", request.name);
        let request = &request;
        let created = self
            .ctx
            .retry
            .with_retry(&what, move || functions.create_function(request))
            .await;

        match created {
            Ok(arn) => {
                info!("Created function {}: {}", request.name, arn);
                Ok(arn)
            }
            Err(e) if e.class() == ErrorClass::Conflict => {
                info!("Function {} already exists", request.name);
                let arn = self.ctx.locator().function_arn(&request.name).await?;
                Ok(arn.unwrap_or_else(|| request.name.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, name: &str, role: &str, policy_name: &str) -> Result<()> {
        let functions = &self.ctx.clients.functions;

        info!("Deleting function {}", name);
        ignore_missing("function", functions.delete_function(name).await)?;
        ignore_missing("role policy", functions.delete_role_policy(role, policy_name).await)?;
        ignore_missing("role", functions.delete_role(role).await)?;
        Ok(())
    }
}

#[async_trait]
impl Provisioner for FunctionPairProvisioner {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Lambdas
    }

    async fn create(&self) -> Result<String> {
        let session = self.session_spec().await?;
        let session_arn = self.deploy(session).await?;

        let login = self.login_spec().await?;
        let login_arn = self.deploy(login).await?;

        Ok(format!("deployed {} and {}", session_arn, login_arn))
    }

    async fn delete(&self) -> Result<String> {
        let config = &self.ctx.config;

        self.remove(
            &config.lambda_start_session_name,
            &config.lambda_session_role,
            &config.lambda_session_policy,
        )
        .await?;
        self.remove(
            &config.lambda_login_name,
            &config.lambda_login_role,
            &config.lambda_login_policy,
        )
        .await?;

        Ok(format!(
            "removed {} and {}",
            config.lambda_start_session_name, config.lambda_login_name
        ))
    }
}
