//! aws CLI JSON response shapes
//!
//! Only the fields Liftoff reads are modelled. GameLift, Cognito, IAM, Lambda
//! and STS answer in PascalCase; API Gateway answers in camelCase.

use liftoff_cloud::NamedResource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

// GameLift

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildSummary {
    pub build_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListBuildsResponse {
    #[serde(default)]
    pub builds: Vec<BuildSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeBuildResponse {
    pub build: BuildSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FleetAttributes {
    pub fleet_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeFleetAttributesResponse {
    #[serde(default)]
    pub fleet_attributes: Vec<FleetAttributes>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateFleetResponse {
    pub fleet_attributes: FleetAttributes,
}

// Cognito

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolsResponse {
    #[serde(default)]
    pub user_pools: Vec<UserPoolSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolDescription {
    pub id: String,
    pub arn: String,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolResponse {
    pub user_pool: UserPoolDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatedUserPool {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolResponse {
    pub user_pool: CreatedUserPool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolClientSummary {
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListUserPoolClientsResponse {
    #[serde(default)]
    pub user_pool_clients: Vec<UserPoolClientSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserPoolClientResponse {
    pub user_pool_client: UserPoolClientSummary,
}

// IAM

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub role_name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleResponse {
    pub role: Role,
}

// Lambda

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionConfiguration {
    pub function_name: String,
    pub function_arn: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetFunctionResponse {
    pub configuration: FunctionConfiguration,
}

// API Gateway

#[derive(Debug, Clone, Deserialize)]
pub struct RestApi {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetRestApisResponse {
    #[serde(default)]
    pub items: Vec<RestApi>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetResourcesResponse {
    #[serde(default)]
    pub items: Vec<Resource>,
}

/// Any API Gateway create call answers with at least an `id`
#[derive(Debug, Clone, Deserialize)]
pub struct Created {
    pub id: String,
}

impl From<BuildSummary> for NamedResource {
    fn from(build: BuildSummary) -> Self {
        NamedResource::new(build.name, build.build_id)
    }
}

impl From<FleetAttributes> for NamedResource {
    fn from(fleet: FleetAttributes) -> Self {
        NamedResource::new(fleet.name, fleet.fleet_id)
    }
}

impl From<UserPoolSummary> for NamedResource {
    fn from(pool: UserPoolSummary) -> Self {
        NamedResource::new(pool.name, pool.id)
    }
}

impl From<UserPoolClientSummary> for NamedResource {
    fn from(client: UserPoolClientSummary) -> Self {
        NamedResource::new(client.client_name, client.client_id)
    }
}

impl From<RestApi> for NamedResource {
    fn from(api: RestApi) -> Self {
        NamedResource::new(api.name, api.id)
    }
}
