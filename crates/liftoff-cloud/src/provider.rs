//! Provider API traits
//!
//! Each trait covers one provider service family and exposes only the calls
//! the provisioners need. [`ProviderClients`] bundles them into the context
//! object handed to every provisioner, so tests can swap in an in-memory
//! backend.

use crate::error::Result;
use crate::resource::{NamedResource, Page};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Credential check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the configured credentials resolve to an identity
    pub authenticated: bool,

    /// Account and principal, if authenticated
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Captured output of an external tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Parameters for a build upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildUpload {
    pub name: String,
    pub version: String,
    pub operating_system: String,
    pub root: String,
}

/// Parameters for fleet creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetRequest {
    pub name: String,
    pub build_id: String,
    pub launch_path: String,
    pub instance_type: String,
    /// Single UDP port opened to 0.0.0.0/0
    pub session_port: u16,
}

/// Build and fleet management.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Run the provider's build upload tool and return its raw output.
    async fn upload_build(&self, upload: &BuildUpload) -> Result<ToolOutput>;

    async fn list_builds(&self, next_token: Option<String>) -> Result<Page<NamedResource>>;

    /// Current status string of a build (e.g. `INITIALIZED`, `READY`).
    async fn build_status(&self, build_id: &str) -> Result<String>;

    async fn delete_build(&self, build_id: &str) -> Result<()>;

    async fn list_fleets(&self, next_token: Option<String>) -> Result<Page<NamedResource>>;

    /// Create a fleet and return its id.
    async fn create_fleet(&self, request: &FleetRequest) -> Result<String>;

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()>;
}

/// Parameters for identity pool creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolRequest {
    pub name: String,
    pub min_password_length: u32,
    /// Required, mutable string attribute (email)
    pub required_attribute: String,
    pub auto_verified_attributes: Vec<String>,
}

/// Describe result for an identity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolDetails {
    pub id: String,
    pub arn: String,
    pub domain: Option<String>,
}

/// Parameters for the public login client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClientRequest {
    pub pool_id: String,
    pub name: String,
    pub explicit_auth_flows: Vec<String>,
    pub oauth_flows: Vec<String>,
    pub oauth_scopes: Vec<String>,
    pub redirect_uri: String,
}

/// A pre-provisioned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Identity pool, client, domain and user management.
#[async_trait]
pub trait IdentityPoolApi: Send + Sync {
    async fn list_user_pools(&self, next_token: Option<String>) -> Result<Page<NamedResource>>;

    async fn describe_user_pool(&self, pool_id: &str) -> Result<UserPoolDetails>;

    /// Create a pool and return its id.
    async fn create_user_pool(&self, request: &UserPoolRequest) -> Result<String>;

    async fn list_app_clients(
        &self,
        pool_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<NamedResource>>;

    /// Create an app client and return its client id.
    async fn create_app_client(&self, request: &AppClientRequest) -> Result<String>;

    async fn create_domain(&self, pool_id: &str, domain: &str) -> Result<()>;

    async fn delete_domain(&self, pool_id: &str, domain: &str) -> Result<()>;

    async fn delete_user_pool(&self, pool_id: &str) -> Result<()>;

    /// Create a user with a temporary password and no invitation message.
    async fn create_user(&self, pool_id: &str, user: &TestUser) -> Result<()>;

    /// Make `password` the user's permanent password.
    async fn set_permanent_password(
        &self,
        pool_id: &str,
        username: &str,
        password: &str,
    ) -> Result<()>;
}

/// Parameters for function creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRequest {
    pub name: String,
    pub role_arn: String,
    pub runtime: String,
    pub handler: String,
    /// Zip archive with the function source
    pub package: Vec<u8>,
}

/// Grant allowing the gateway service to invoke a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokePermission {
    pub function: String,
    pub statement_id: String,
    pub principal: String,
    pub source_arn: String,
}

/// Functions and their execution identities.
#[async_trait]
pub trait FunctionApi: Send + Sync {
    async fn get_role_arn(&self, role: &str) -> Result<Option<String>>;

    /// Create a role with the given trust policy and return its ARN.
    async fn create_role(&self, role: &str, trust_policy: &str) -> Result<String>;

    async fn put_role_policy(&self, role: &str, policy_name: &str, document: &str) -> Result<()>;

    async fn delete_role_policy(&self, role: &str, policy_name: &str) -> Result<()>;

    async fn delete_role(&self, role: &str) -> Result<()>;

    async fn get_function_arn(&self, name: &str) -> Result<Option<String>>;

    /// Create a function and return its ARN.
    async fn create_function(&self, request: &FunctionRequest) -> Result<String>;

    async fn delete_function(&self, name: &str) -> Result<()>;

    async fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<()>;

    async fn remove_invoke_permission(&self, function: &str, statement_id: &str) -> Result<()>;
}

/// Parameters for the bearer-token authorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerRequest {
    pub api_id: String,
    pub name: String,
    pub provider_arn: String,
    pub identity_source: String,
}

/// A path resource of an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub id: String,
    pub path: String,
}

/// Method declaration on an API resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRequest {
    pub api_id: String,
    pub resource_id: String,
    pub http_method: String,
    /// `None` means no authorization
    pub authorizer_id: Option<String>,
}

/// HTTP gateway management.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn list_rest_apis(&self, next_token: Option<String>) -> Result<Page<NamedResource>>;

    /// Create an API and return its id.
    async fn create_rest_api(&self, name: &str) -> Result<String>;

    async fn delete_rest_api(&self, api_id: &str) -> Result<()>;

    /// Create an authorizer and return its id.
    async fn create_authorizer(&self, request: &AuthorizerRequest) -> Result<String>;

    async fn get_resources(&self, api_id: &str) -> Result<Vec<ApiResource>>;

    /// Create a path segment under `parent_id` and return the new resource id.
    async fn create_resource(
        &self,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<String>;

    async fn put_method(&self, request: &MethodRequest) -> Result<()>;

    async fn put_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        uri: &str,
    ) -> Result<()>;

    async fn put_integration_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
        selection_pattern: &str,
    ) -> Result<()>;

    async fn put_method_response(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
    ) -> Result<()>;

    /// Deploy the API to a stage and return the deployment id.
    async fn create_deployment(&self, api_id: &str, stage_name: &str) -> Result<String>;

    /// Account that owns the gateway (used in invoke source ARNs).
    async fn account_id(&self) -> Result<String>;
}

/// Provider client handles injected into every provisioner.
#[derive(Clone)]
pub struct ProviderClients {
    pub fleets: Arc<dyn FleetApi>,
    pub identity: Arc<dyn IdentityPoolApi>,
    pub functions: Arc<dyn FunctionApi>,
    pub gateway: Arc<dyn GatewayApi>,
}

impl ProviderClients {
    /// Use a single backend for every service family.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: FleetApi + IdentityPoolApi + FunctionApi + GatewayApi + 'static,
    {
        Self {
            fleets: backend.clone(),
            identity: backend.clone(),
            functions: backend.clone(),
            gateway: backend,
        }
    }
}
