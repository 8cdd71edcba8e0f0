//! Gateway provisioner
//!
//! Binds the login function (no authorization) and the start-session
//! function (pool authorizer) under one REST API and deploys it.

use super::identity_pool::TEST_PASSWORD;
use super::{ProvisionContext, Provisioner, ignore_missing};
use crate::error::{CloudError, Result};
use crate::locator::require;
use crate::provider::{AuthorizerRequest, InvokePermission, MethodRequest};
use crate::resource::ResourceKind;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

const GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";
const AUTHORIZATION_HEADER: &str = "method.request.header.Authorization";

/// Invoke-permission statement id for the binding of `path_part`.
///
/// Stable across runs so a later run can revoke what an earlier one granted.
pub fn statement_id(rest_api_name: &str, path_part: &str) -> String {
    format!("{}-{}", rest_api_name, path_part)
}

pub fn invoke_url(api_id: &str, region: &str, stage: &str) -> String {
    format!("https://{}.execute-api.{}.amazonaws.com/{}", api_id, region, stage)
}

/// One path segment routed to one function
struct Binding<'a> {
    path_part: &'a str,
    http_method: &'a str,
    function_arn: &'a str,
    authorizer_id: Option<&'a str>,
}

pub struct GatewayProvisioner {
    ctx: Arc<ProvisionContext>,
}

impl GatewayProvisioner {
    pub fn new(ctx: Arc<ProvisionContext>) -> Self {
        Self { ctx }
    }

    async fn bind(&self, api_id: &str, account_id: &str, binding: Binding<'_>) -> Result<()> {
        let config = &self.ctx.config;
        let gateway = &self.ctx.clients.gateway;
        let functions = &self.ctx.clients.functions;

        let root_id = gateway
            .get_resources(api_id)
            .await?
            .into_iter()
            .find(|resource| resource.path == "/")
            .map(|resource| resource.id)
            .ok_or_else(|| CloudError::ResourceMissing(format!("root resource of API {}", api_id)))?;

        info!("Binding /{} to {}", binding.path_part, binding.function_arn);
        let resource_id = gateway
            .create_resource(api_id, &root_id, binding.path_part)
            .await?;

        gateway
            .put_method(&MethodRequest {
                api_id: api_id.to_string(),
                resource_id: resource_id.clone(),
                http_method: binding.http_method.to_string(),
                authorizer_id: binding.authorizer_id.map(String::from),
            })
            .await?;

        let uri = format!(
            "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
            config.region, binding.function_arn
        );
        gateway
            .put_integration(api_id, &resource_id, binding.http_method, &uri)
            .await?;

        let statement_id = statement_id(&config.rest_api_name, binding.path_part);
        ignore_missing(
            "invoke permission",
            functions
                .remove_invoke_permission(binding.function_arn, &statement_id)
                .await,
        )?;
        functions
            .add_invoke_permission(&InvokePermission {
                function: binding.function_arn.to_string(),
                statement_id,
                principal: GATEWAY_PRINCIPAL.to_string(),
                source_arn: format!(
                    "arn:aws:execute-api:{}:{}:{}/*/*/{}",
                    config.region, account_id, api_id, binding.path_part
                ),
            })
            .await?;

        gateway
            .put_integration_response(api_id, &resource_id, binding.http_method, "200", ".*")
            .await?;
        gateway
            .put_method_response(api_id, &resource_id, binding.http_method, "200")
            .await?;
        Ok(())
    }

    fn log_examples(&self, url: &str) {
        let config = &self.ctx.config;
        info!("Invoke URL: {}", url);
        info!(
            "Login: curl -X POST -d '{{\"username\":\"user0\",\"password\":\"{}\"}}' {}/{}",
            TEST_PASSWORD, url, config.rest_api_login_path
        );
        info!(
            "Start session: curl -X GET -H 'Authorization: Bearer [IdToken]' {}/{}",
            url, config.rest_api_start_session_path
        );
    }
}

#[async_trait]
impl Provisioner for GatewayProvisioner {
    fn kind(&self) -> ResourceKind {
        ResourceKind::RestApi
    }

    async fn create(&self) -> Result<String> {
        let config = &self.ctx.config;
        let gateway = &self.ctx.clients.gateway;
        let locator = self.ctx.locator();

        if let Some(api_id) = locator.rest_api_id(&config.rest_api_name).await? {
            info!("REST API {} already exists: {}", config.rest_api_name, api_id);
            return Ok(format!("{} already exists ({})", config.rest_api_name, api_id));
        }

        // Everything the API binds must exist before anything is created.
        let pool_arn = require(
            "user pool",
            &config.user_pool_name,
            locator.user_pool_arn(&config.user_pool_name).await?,
        )?;
        let login_arn = require(
            "function",
            &config.lambda_login_name,
            locator.function_arn(&config.lambda_login_name).await?,
        )?;
        let session_arn = require(
            "function",
            &config.lambda_start_session_name,
            locator.function_arn(&config.lambda_start_session_name).await?,
        )?;
        let account_id = gateway.account_id().await?;

        info!("Creating REST API {}", config.rest_api_name);
        let api_id = gateway.create_rest_api(&config.rest_api_name).await?;

        info!("Creating authorizer {}", config.rest_api_authorizer_name);
        let authorizer_id = gateway
            .create_authorizer(&AuthorizerRequest {
                api_id: api_id.clone(),
                name: config.rest_api_authorizer_name.clone(),
                provider_arn: pool_arn,
                identity_source: AUTHORIZATION_HEADER.to_string(),
            })
            .await?;

        self.bind(
            &api_id,
            &account_id,
            Binding {
                path_part: &config.rest_api_login_path,
                http_method: "POST",
                function_arn: &login_arn,
                authorizer_id: None,
            },
        )
        .await?;
        self.bind(
            &api_id,
            &account_id,
            Binding {
                path_part: &config.rest_api_start_session_path,
                http_method: "GET",
                function_arn: &session_arn,
                authorizer_id: Some(&authorizer_id),
            },
        )
        .await?;

        info!("Deploying {} to stage {}", api_id, config.rest_api_stage_name);
        gateway
            .create_deployment(&api_id, &config.rest_api_stage_name)
            .await?;

        let url = invoke_url(&api_id, &config.region, &config.rest_api_stage_name);
        self.log_examples(&url);
        Ok(format!("deployed {} ({}) at {}", config.rest_api_name, api_id, url))
    }

    async fn delete(&self) -> Result<String> {
        let config = &self.ctx.config;
        let gateway = &self.ctx.clients.gateway;
        let locator = self.ctx.locator();
        let mut deleted = HashSet::new();

        while let Some(api_id) = locator
            .rest_api_id_excluding(&config.rest_api_name, &deleted)
            .await?
        {
            info!("Deleting REST API {} ({})", config.rest_api_name, api_id);
            let id = api_id.as_str();
            self.ctx
                .retry
                .with_retry("delete REST API", move || gateway.delete_rest_api(id))
                .await?;
            deleted.insert(api_id);
        }

        let functions = &self.ctx.clients.functions;
        for (function, path_part) in [
            (&config.lambda_login_name, &config.rest_api_login_path),
            (&config.lambda_start_session_name, &config.rest_api_start_session_path),
        ] {
            let statement_id = statement_id(&config.rest_api_name, path_part);
            ignore_missing(
                "invoke permission",
                functions.remove_invoke_permission(function, &statement_id).await,
            )?;
        }

        if deleted.is_empty() {
            info!("REST API {} not found, nothing to delete", config.rest_api_name);
            return Ok(format!("{} not found", config.rest_api_name));
        }
        Ok(format!(
            "deleted {} REST API(s) named {}",
            deleted.len(),
            config.rest_api_name
        ))
    }
}
