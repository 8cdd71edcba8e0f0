//! AWS provider implementation
//!
//! Maps the provider traits onto GameLift, Cognito, IAM, Lambda, API Gateway
//! and STS operations of the aws CLI.

use crate::cli::{AwsCli, page_args};
use crate::error::AwsError;
use crate::models::*;
use async_trait::async_trait;
use liftoff_cloud::provider::{
    ApiResource, AppClientRequest, AuthorizerRequest, BuildUpload, FleetRequest, FunctionRequest,
    InvokePermission, MethodRequest, TestUser, UserPoolDetails, UserPoolRequest,
};
use liftoff_cloud::{
    AuthStatus, FleetApi, FunctionApi, GatewayApi, IdentityPoolApi, NamedResource, Page,
    ProviderClients, Result, ToolOutput,
};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

const PAGE_SIZE: &str = "50";
/// Cognito caps listing pages at 60
const COGNITO_PAGE_SIZE: &str = "60";

fn page<T: Into<NamedResource>>(items: Vec<T>, next_token: Option<String>) -> Page<NamedResource> {
    Page {
        items: items.into_iter().map(Into::into).collect(),
        next_token,
    }
}

/// Turn a not-found service error into `None`.
fn optional<T>(result: std::result::Result<T, AwsError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `create-user-pool-client` arguments. The redirect URI doubles as the logout URL.
fn app_client_args(request: &AppClientRequest) -> Vec<&str> {
    let mut args = vec![
        "cognito-idp",
        "create-user-pool-client",
        "--user-pool-id",
        request.pool_id.as_str(),
        "--client-name",
        request.name.as_str(),
        "--callback-urls",
        request.redirect_uri.as_str(),
        "--logout-urls",
        request.redirect_uri.as_str(),
        "--supported-identity-providers",
        "COGNITO",
        "--allowed-o-auth-flows-user-pool-client",
    ];
    args.push("--explicit-auth-flows");
    args.extend(request.explicit_auth_flows.iter().map(String::as_str));
    args.push("--allowed-o-auth-flows");
    args.extend(request.oauth_flows.iter().map(String::as_str));
    args.push("--allowed-o-auth-scopes");
    args.extend(request.oauth_scopes.iter().map(String::as_str));
    args
}

fn put_method_args(request: &MethodRequest) -> Vec<&str> {
    let mut args = vec![
        "apigateway",
        "put-method",
        "--rest-api-id",
        request.api_id.as_str(),
        "--resource-id",
        request.resource_id.as_str(),
        "--http-method",
        request.http_method.as_str(),
    ];
    match &request.authorizer_id {
        Some(authorizer_id) => args.extend([
            "--authorization-type",
            "COGNITO_USER_POOLS",
            "--authorizer-id",
            authorizer_id.as_str(),
        ]),
        None => args.extend(["--authorization-type", "NONE"]),
    }
    args
}

/// AWS provider
pub struct AwsProvider {
    cli: AwsCli,
}

impl AwsProvider {
    pub fn new(profile: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            cli: AwsCli::new(profile, region),
        }
    }

    /// Provider clients backed by this provider for every service family.
    pub fn into_clients(self) -> ProviderClients {
        ProviderClients::from_backend(Arc::new(self))
    }

    /// Check the aws CLI and credentials
    pub async fn check_auth(&self) -> AuthStatus {
        match self.cli.check_auth().await {
            Ok(identity) => {
                AuthStatus::ok(format!("account {} ({})", identity.account, identity.arn))
            }
            Err(e) => AuthStatus::failed(e.to_string()),
        }
    }
}

#[async_trait]
impl FleetApi for AwsProvider {
    async fn upload_build(&self, upload: &BuildUpload) -> Result<ToolOutput> {
        let output = self
            .cli
            .run_raw(&[
                "gamelift",
                "upload-build",
                "--operating-system",
                &upload.operating_system,
                "--build-root",
                &upload.root,
                "--name",
                &upload.name,
                "--build-version",
                &upload.version,
            ])
            .await?;
        Ok(output)
    }

    async fn list_builds(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let mut args = vec!["gamelift", "list-builds"];
        args.extend(page_args(PAGE_SIZE, next_token.as_deref()));

        let response: ListBuildsResponse = self.cli.run_json(&args).await?;
        Ok(page(response.builds, response.next_token))
    }

    async fn build_status(&self, build_id: &str) -> Result<String> {
        let response: DescribeBuildResponse = self
            .cli
            .run_json(&["gamelift", "describe-build", "--build-id", build_id])
            .await?;
        Ok(response.build.status)
    }

    async fn delete_build(&self, build_id: &str) -> Result<()> {
        self.cli
            .run_unit(&["gamelift", "delete-build", "--build-id", build_id])
            .await?;
        Ok(())
    }

    async fn list_fleets(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let mut args = vec!["gamelift", "describe-fleet-attributes"];
        args.extend(page_args(PAGE_SIZE, next_token.as_deref()));

        let response: DescribeFleetAttributesResponse = self.cli.run_json(&args).await?;
        Ok(page(response.fleet_attributes, response.next_token))
    }

    async fn create_fleet(&self, request: &FleetRequest) -> Result<String> {
        let inbound = format!(
            "FromPort={port},ToPort={port},IpRange=0.0.0.0/0,Protocol=UDP",
            port = request.session_port
        );
        let response: CreateFleetResponse = self
            .cli
            .run_json(&[
                "gamelift",
                "create-fleet",
                "--name",
                &request.name,
                "--build-id",
                &request.build_id,
                "--server-launch-path",
                &request.launch_path,
                "--ec2-instance-type",
                &request.instance_type,
                "--fleet-type",
                "ON_DEMAND",
                "--ec2-inbound-permissions",
                &inbound,
            ])
            .await?;
        Ok(response.fleet_attributes.fleet_id)
    }

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()> {
        self.cli
            .run_unit(&["gamelift", "delete-fleet", "--fleet-id", fleet_id])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityPoolApi for AwsProvider {
    async fn list_user_pools(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let mut args = vec![
            "cognito-idp",
            "list-user-pools",
            "--max-results",
            COGNITO_PAGE_SIZE,
        ];
        args.extend(page_args(COGNITO_PAGE_SIZE, next_token.as_deref()));

        let response: ListUserPoolsResponse = self.cli.run_json(&args).await?;
        Ok(page(response.user_pools, response.next_token))
    }

    async fn describe_user_pool(&self, pool_id: &str) -> Result<UserPoolDetails> {
        let response: UserPoolResponse = self
            .cli
            .run_json(&["cognito-idp", "describe-user-pool", "--user-pool-id", pool_id])
            .await?;
        let pool = response.user_pool;
        Ok(UserPoolDetails {
            id: pool.id,
            arn: pool.arn,
            domain: pool.domain,
        })
    }

    async fn create_user_pool(&self, request: &UserPoolRequest) -> Result<String> {
        let policies = json!({
            "PasswordPolicy": {
                "MinimumLength": request.min_password_length,
                "RequireUppercase": false,
                "RequireLowercase": false,
                "RequireNumbers": false,
                "RequireSymbols": false
            }
        })
        .to_string();
        let schema = json!([{
            "Name": request.required_attribute,
            "AttributeDataType": "String",
            "Required": true,
            "Mutable": true
        }])
        .to_string();

        let mut args = vec![
            "cognito-idp",
            "create-user-pool",
            "--pool-name",
            request.name.as_str(),
            "--policies",
            policies.as_str(),
            "--schema",
            schema.as_str(),
        ];
        if !request.auto_verified_attributes.is_empty() {
            args.push("--auto-verified-attributes");
            args.extend(request.auto_verified_attributes.iter().map(String::as_str));
        }

        let response: CreateUserPoolResponse = self.cli.run_json(&args).await?;
        Ok(response.user_pool.id)
    }

    async fn list_app_clients(
        &self,
        pool_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<NamedResource>> {
        let mut args = vec![
            "cognito-idp",
            "list-user-pool-clients",
            "--user-pool-id",
            pool_id,
            "--max-results",
            COGNITO_PAGE_SIZE,
        ];
        args.extend(page_args(COGNITO_PAGE_SIZE, next_token.as_deref()));

        let response: ListUserPoolClientsResponse = self.cli.run_json(&args).await?;
        Ok(page(response.user_pool_clients, response.next_token))
    }

    async fn create_app_client(&self, request: &AppClientRequest) -> Result<String> {
        let args = app_client_args(request);
        let response: CreateUserPoolClientResponse = self.cli.run_json(&args).await?;
        Ok(response.user_pool_client.client_id)
    }

    async fn create_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.cli
            .run_unit(&[
                "cognito-idp",
                "create-user-pool-domain",
                "--domain",
                domain,
                "--user-pool-id",
                pool_id,
            ])
            .await?;
        Ok(())
    }

    async fn delete_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        self.cli
            .run_unit(&[
                "cognito-idp",
                "delete-user-pool-domain",
                "--domain",
                domain,
                "--user-pool-id",
                pool_id,
            ])
            .await?;
        Ok(())
    }

    async fn delete_user_pool(&self, pool_id: &str) -> Result<()> {
        self.cli
            .run_unit(&["cognito-idp", "delete-user-pool", "--user-pool-id", pool_id])
            .await?;
        Ok(())
    }

    async fn create_user(&self, pool_id: &str, user: &TestUser) -> Result<()> {
        let email = format!("Name=email,Value={}", user.email);
        self.cli
            .run_unit(&[
                "cognito-idp",
                "admin-create-user",
                "--user-pool-id",
                pool_id,
                "--username",
                &user.username,
                "--user-attributes",
                &email,
                "Name=email_verified,Value=true",
                "--temporary-password",
                &user.password,
                "--message-action",
                "SUPPRESS",
            ])
            .await?;
        Ok(())
    }

    async fn set_permanent_password(
        &self,
        pool_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()> {
        self.cli
            .run_unit(&[
                "cognito-idp",
                "admin-set-user-password",
                "--user-pool-id",
                pool_id,
                "--username",
                username,
                "--password",
                password,
                "--permanent",
            ])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FunctionApi for AwsProvider {
    async fn get_role_arn(&self, role: &str) -> Result<Option<String>> {
        let response = optional(
            self.cli
                .run_json::<RoleResponse>(&["iam", "get-role", "--role-name", role])
                .await,
        )?;
        Ok(response.map(|r| r.role.arn))
    }

    async fn create_role(&self, role: &str, trust_policy: &str) -> Result<String> {
        let response: RoleResponse = self
            .cli
            .run_json(&[
                "iam",
                "create-role",
                "--role-name",
                role,
                "--assume-role-policy-document",
                trust_policy,
            ])
            .await?;
        Ok(response.role.arn)
    }

    async fn put_role_policy(&self, role: &str, policy_name: &str, document: &str) -> Result<()> {
        self.cli
            .run_unit(&[
                "iam",
                "put-role-policy",
                "--role-name",
                role,
                "--policy-name",
                policy_name,
                "--policy-document",
                document,
            ])
            .await?;
        Ok(())
    }

    async fn delete_role_policy(&self, role: &str, policy_name: &str) -> Result<()> {
        self.cli
            .run_unit(&[
                "iam",
                "delete-role-policy",
                "--role-name",
                role,
                "--policy-name",
                policy_name,
            ])
            .await?;
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> Result<()> {
        self.cli
            .run_unit(&["iam", "delete-role", "--role-name", role])
            .await?;
        Ok(())
    }

    async fn get_function_arn(&self, name: &str) -> Result<Option<String>> {
        let response = optional(
            self.cli
                .run_json::<GetFunctionResponse>(&["lambda", "get-function", "--function-name", name])
                .await,
        )?;
        Ok(response.map(|r| r.configuration.function_arn))
    }

    async fn create_function(&self, request: &FunctionRequest) -> Result<String> {
        // The CLI only takes the archive from a file; keep it until the call returns.
        let mut archive = tempfile::Builder::new()
            .prefix("liftoff-")
            .suffix(".zip")
            .tempfile()?;
        archive.write_all(&request.package)?;
        archive.flush()?;
        let zip_file = format!("fileb://{}", archive.path().display());

        let response: FunctionConfiguration = self
            .cli
            .run_json(&[
                "lambda",
                "create-function",
                "--function-name",
                &request.name,
                "--runtime",
                &request.runtime,
                "--role",
                &request.role_arn,
                "--handler",
                &request.handler,
                "--zip-file",
                &zip_file,
                "--publish",
            ])
            .await?;
        Ok(response.function_arn)
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        self.cli
            .run_unit(&["lambda", "delete-function", "--function-name", name])
            .await?;
        Ok(())
    }

    async fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<()> {
        self.cli
            .run_unit(&[
                "lambda",
                "add-permission",
                "--function-name",
                &permission.function,
                "--statement-id",
                &permission.statement_id,
                "--action",
                "lambda:InvokeFunction",
                "--principal",
                &permission.principal,
                "--source-arn",
                &permission.source_arn,
            ])
            .await?;
        Ok(())
    }

    async fn remove_invoke_permission(&self, function: &str, statement_id: &str) -> Result<()> {
        self.cli
            .run_unit(&[
                "lambda",
                "remove-permission",
                "--function-name",
                function,
                "--statement-id",
                statement_id,
            ])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for AwsProvider {
    async fn list_rest_apis(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let mut args = vec!["apigateway", "get-rest-apis"];
        args.extend(page_args(PAGE_SIZE, next_token.as_deref()));

        let response: GetRestApisResponse = self.cli.run_json(&args).await?;
        Ok(page(response.items, response.next_token))
    }

    async fn create_rest_api(&self, name: &str) -> Result<String> {
        let response: Created = self
            .cli
            .run_json(&["apigateway", "create-rest-api", "--name", name])
            .await?;
        Ok(response.id)
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        self.cli
            .run_unit(&["apigateway", "delete-rest-api", "--rest-api-id", api_id])
            .await?;
        Ok(())
    }

    async fn create_authorizer(&self, request: &AuthorizerRequest) -> Result<String> {
        let response: Created = self
            .cli
            .run_json(&[
                "apigateway",
                "create-authorizer",
                "--rest-api-id",
                &request.api_id,
                "--name",
                &request.name,
                "--type",
                "COGNITO_USER_POOLS",
                "--provider-arns",
                &request.provider_arn,
                "--identity-source",
                &request.identity_source,
            ])
            .await?;
        Ok(response.id)
    }

    async fn get_resources(&self, api_id: &str) -> Result<Vec<ApiResource>> {
        let response: GetResourcesResponse = self
            .cli
            .run_json(&["apigateway", "get-resources", "--rest-api-id", api_id])
            .await?;
        Ok(response
            .items
            .into_iter()
            .map(|r| ApiResource {
                id: r.id,
                path: r.path,
            })
            .collect())
    }

    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let response: Created = self
            .cli
            .run_json(&[
                "apigateway",
                "create-resource",
                "--rest-api-id",
                api_id,
                "--parent-id",
                parent_id,
                "--path-part",
                path_part,
            ])
            .await?;
        Ok(response.id)
    }

    async fn put_method(&self, request: &MethodRequest) -> Result<()> {
        self.cli.run_unit(&put_method_args(request)).await?;
        Ok(())
    }

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        uri: &str,
    ) -> Result<()> {
        // Lambda integrations are always invoked with POST
        self.cli
            .run_unit(&[
                "apigateway",
                "put-integration",
                "--rest-api-id",
                api_id,
                "--resource-id",
                resource_id,
                "--http-method",
                http_method,
                "--type",
                "AWS",
                "--integration-http-method",
                "POST",
                "--uri",
                uri,
            ])
            .await?;
        Ok(())
    }

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
        selection_pattern: &str,
    ) -> Result<()> {
        self.cli
            .run_unit(&[
                "apigateway",
                "put-integration-response",
                "--rest-api-id",
                api_id,
                "--resource-id",
                resource_id,
                "--http-method",
                http_method,
                "--status-code",
                status_code,
                "--selection-pattern",
                selection_pattern,
            ])
            .await?;
        Ok(())
    }

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
    ) -> Result<()> {
        self.cli
            .run_unit(&[
                "apigateway",
                "put-method-response",
                "--rest-api-id",
                api_id,
                "--resource-id",
                resource_id,
                "--http-method",
                http_method,
                "--status-code",
                status_code,
            ])
            .await?;
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage_name: &str) -> Result<String> {
        let response: Created = self
            .cli
            .run_json(&[
                "apigateway",
                "create-deployment",
                "--rest-api-id",
                api_id,
                "--stage-name",
                stage_name,
            ])
            .await?;
        Ok(response.id)
    }

    async fn account_id(&self) -> Result<String> {
        Ok(self.cli.caller_identity().await?.account)
    }
}
