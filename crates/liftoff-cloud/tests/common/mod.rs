//! In-memory provider used by the integration tests.
//!
//! Implements every provider trait over a shared [`State`], records each call
//! by name and pages listings two items at a time so lookups have to follow
//! next tokens.

use async_trait::async_trait;
use liftoff_cloud::provider::{
    ApiResource, AppClientRequest, AuthorizerRequest, BuildUpload, FleetRequest, FunctionRequest,
    InvokePermission, MethodRequest, TestUser, UserPoolDetails, UserPoolRequest,
};
use liftoff_cloud::{
    CloudError, FleetApi, FunctionApi, GatewayApi, IdentityPoolApi, NamedResource, Page,
    PollConfig, ProviderClients, ProvisionContext, Result, RetryConfig, StageOrchestrator,
    ToolOutput,
};
use liftoff_config::{StageConfig, StageOverrides};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const ACCOUNT_ID: &str = "123456789012";
const PAGE_SIZE: usize = 2;

type FailureFn = Box<dyn Fn() -> CloudError + Send + Sync>;

pub struct FakePool {
    pub name: String,
    pub id: String,
    pub domain: Option<String>,
    pub clients: Vec<NamedResource>,
    pub users: Vec<String>,
}

pub struct FakeApi {
    pub name: String,
    pub id: String,
    pub resources: Vec<ApiResource>,
    pub deployments: Vec<String>,
}

#[derive(Default)]
pub struct State {
    pub builds: Vec<NamedResource>,
    /// Statuses returned by successive build_status calls; READY once drained
    pub build_statuses: VecDeque<String>,
    pub fleets: Vec<NamedResource>,
    pub pools: Vec<FakePool>,
    pub roles: HashMap<String, String>,
    pub role_policies: HashSet<(String, String)>,
    pub functions: HashMap<String, FunctionRequest>,
    pub permissions: HashSet<(String, String)>,
    pub apis: Vec<FakeApi>,
    /// Authorizer requests keyed by the id handed back
    pub authorizers: Vec<(String, AuthorizerRequest)>,
    pub methods: Vec<MethodRequest>,
    pub calls: Vec<String>,
    create_function_failure: Option<FailureFn>,
    create_fleet_failure: Option<FailureFn>,
    /// Deletes succeed but builds and APIs stay listed
    stale_listings: bool,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: &str) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call.to_string());
        state
    }

    /// Number of recorded calls named `call`
    pub fn calls(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == call).count()
    }

    /// Position of the first recorded call named `call`
    pub fn first_call(&self, call: &str) -> Option<usize> {
        self.state().calls.iter().position(|c| c == call)
    }

    pub fn seed_build(&self, name: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("build");
        state.builds.push(NamedResource::new(name, id.clone()));
        id
    }

    pub fn seed_fleet(&self, name: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("fleet");
        state.fleets.push(NamedResource::new(name, id.clone()));
        id
    }

    pub fn seed_rest_api(&self, name: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("api");
        let root = state.next_id("root");
        state.apis.push(FakeApi {
            name: name.to_string(),
            id: id.clone(),
            resources: vec![ApiResource {
                id: root,
                path: "/".to_string(),
            }],
            deployments: Vec::new(),
        });
        id
    }

    /// Seed unrelated entries so the interesting ones land on later pages.
    pub fn seed_noise(&self, count: usize) {
        let mut state = self.state();
        for i in 0..count {
            let build = state.next_id("build");
            state.builds.push(NamedResource::new(format!("other-build-{}", i), build));
            let fleet = state.next_id("fleet");
            state.fleets.push(NamedResource::new(format!("other-fleet-{}", i), fleet));
            let pool = state.next_id("pool");
            state.pools.push(FakePool {
                name: format!("other-pool-{}", i),
                id: pool,
                domain: None,
                clients: Vec::new(),
                users: Vec::new(),
            });
        }
    }

    pub fn script_build_statuses(&self, statuses: &[&str]) {
        self.state().build_statuses = statuses.iter().map(|s| s.to_string()).collect();
    }

    pub fn fail_create_function(&self, failure: impl Fn() -> CloudError + Send + Sync + 'static) {
        self.state().create_function_failure = Some(Box::new(failure));
    }

    pub fn fail_create_fleet(&self, failure: impl Fn() -> CloudError + Send + Sync + 'static) {
        self.state().create_fleet_failure = Some(Box::new(failure));
    }

    /// Keep listing deleted builds and APIs, like an eventually consistent provider.
    pub fn keep_deleted_listed(&self) {
        self.state().stale_listings = true;
    }

    /// Path of the API resource a method was declared on
    pub fn method_path(&self, request: &MethodRequest) -> Option<String> {
        self.state()
            .apis
            .iter()
            .find(|a| a.id == request.api_id)
            .and_then(|a| a.resources.iter().find(|r| r.id == request.resource_id))
            .map(|r| r.path.clone())
    }

    pub fn function_package(&self, name: &str) -> Option<Vec<u8>> {
        self.state().functions.get(name).map(|f| f.package.clone())
    }

    pub fn client_id(&self, pool_name: &str) -> Option<String> {
        self.state()
            .pools
            .iter()
            .find(|p| p.name == pool_name)
            .and_then(|p| p.clients.first())
            .map(|c| c.id.clone())
    }
}

fn paginate(items: Vec<NamedResource>, next_token: Option<String>) -> Result<Page<NamedResource>> {
    let start = match next_token {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| CloudError::ApiError(format!("bad token {}", token)))?,
        None => 0,
    };
    let end = (start + PAGE_SIZE).min(items.len());
    let next_token = (end < items.len()).then(|| end.to_string());
    Ok(Page {
        items: items[start.min(end)..end].to_vec(),
        next_token,
    })
}

fn missing(what: &str) -> CloudError {
    CloudError::ResourceMissing(what.to_string())
}

#[async_trait]
impl FleetApi for FakeCloud {
    async fn upload_build(&self, upload: &BuildUpload) -> Result<ToolOutput> {
        let mut state = self.record("upload_build");
        let id = state.next_id("build");
        state.builds.push(NamedResource::new(&upload.name, id.clone()));
        Ok(ToolOutput {
            success: true,
            stdout: format!("Uploading {}\nSuccessfully uploaded. Build ID: {}\n", upload.root, id),
            stderr: String::new(),
        })
    }

    async fn list_builds(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let builds = self.record("list_builds").builds.clone();
        paginate(builds, next_token)
    }

    async fn build_status(&self, build_id: &str) -> Result<String> {
        let mut state = self.record("build_status");
        if !state.builds.iter().any(|b| b.id == build_id) {
            return Err(missing(build_id));
        }
        Ok(state
            .build_statuses
            .pop_front()
            .unwrap_or_else(|| "READY".to_string()))
    }

    async fn delete_build(&self, build_id: &str) -> Result<()> {
        let mut state = self.record("delete_build");
        if state.stale_listings {
            return Ok(());
        }
        let before = state.builds.len();
        state.builds.retain(|b| b.id != build_id);
        if state.builds.len() == before {
            return Err(missing(build_id));
        }
        Ok(())
    }

    async fn list_fleets(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let fleets = self.record("list_fleets").fleets.clone();
        paginate(fleets, next_token)
    }

    async fn create_fleet(&self, request: &FleetRequest) -> Result<String> {
        let mut state = self.record("create_fleet");
        if let Some(failure) = &state.create_fleet_failure {
            return Err(failure());
        }
        if !state.builds.iter().any(|b| b.id == request.build_id) {
            return Err(missing(&request.build_id));
        }
        let id = state.next_id("fleet");
        state.fleets.push(NamedResource::new(&request.name, id.clone()));
        Ok(id)
    }

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()> {
        let mut state = self.record("delete_fleet");
        let before = state.fleets.len();
        state.fleets.retain(|f| f.id != fleet_id);
        if state.fleets.len() == before {
            return Err(missing(fleet_id));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityPoolApi for FakeCloud {
    async fn list_user_pools(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let pools = self
            .record("list_user_pools")
            .pools
            .iter()
            .map(|p| NamedResource::new(&p.name, &p.id))
            .collect();
        paginate(pools, next_token)
    }

    async fn describe_user_pool(&self, pool_id: &str) -> Result<UserPoolDetails> {
        let state = self.record("describe_user_pool");
        let pool = state
            .pools
            .iter()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| missing(pool_id))?;
        Ok(UserPoolDetails {
            id: pool.id.clone(),
            arn: format!("arn:aws:cognito-idp:us-west-2:{}:userpool/{}", ACCOUNT_ID, pool.id),
            domain: pool.domain.clone(),
        })
    }

    async fn create_user_pool(&self, request: &UserPoolRequest) -> Result<String> {
        let mut state = self.record("create_user_pool");
        let id = state.next_id("us-west-2_pool");
        state.pools.push(FakePool {
            name: request.name.clone(),
            id: id.clone(),
            domain: None,
            clients: Vec::new(),
            users: Vec::new(),
        });
        Ok(id)
    }

    async fn list_app_clients(
        &self,
        pool_id: &str,
        next_token: Option<String>,
    ) -> Result<Page<NamedResource>> {
        let state = self.record("list_app_clients");
        let pool = state
            .pools
            .iter()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| missing(pool_id))?;
        paginate(pool.clients.clone(), next_token)
    }

    async fn create_app_client(&self, request: &AppClientRequest) -> Result<String> {
        let mut state = self.record("create_app_client");
        let id = state.next_id("client");
        let pool = state
            .pools
            .iter_mut()
            .find(|p| p.id == request.pool_id)
            .ok_or_else(|| missing(&request.pool_id))?;
        pool.clients.push(NamedResource::new(&request.name, id.clone()));
        Ok(id)
    }

    async fn create_domain(&self, pool_id: &str, domain: &str) -> Result<()> {
        let mut state = self.record("create_domain");
        let pool = state
            .pools
            .iter_mut()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| missing(pool_id))?;
        pool.domain = Some(domain.to_string());
        Ok(())
    }

    async fn delete_domain(&self, pool_id: &str, _domain: &str) -> Result<()> {
        let mut state = self.record("delete_domain");
        let pool = state
            .pools
            .iter_mut()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| missing(pool_id))?;
        pool.domain.take().map(|_| ()).ok_or_else(|| missing("domain"))
    }

    async fn delete_user_pool(&self, pool_id: &str) -> Result<()> {
        let mut state = self.record("delete_user_pool");
        let before = state.pools.len();
        state.pools.retain(|p| p.id != pool_id);
        if state.pools.len() == before {
            return Err(missing(pool_id));
        }
        Ok(())
    }

    async fn create_user(&self, pool_id: &str, user: &TestUser) -> Result<()> {
        let mut state = self.record("create_user");
        let pool = state
            .pools
            .iter_mut()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| missing(pool_id))?;
        pool.users.push(user.username.clone());
        Ok(())
    }

    async fn set_permanent_password(
        &self,
        _pool_id: &str,
        _username: &str,
        _password: &str,
    ) -> Result<()> {
        self.record("set_permanent_password");
        Ok(())
    }
}

#[async_trait]
impl FunctionApi for FakeCloud {
    async fn get_role_arn(&self, role: &str) -> Result<Option<String>> {
        Ok(self.record("get_role_arn").roles.get(role).cloned())
    }

    async fn create_role(&self, role: &str, _trust_policy: &str) -> Result<String> {
        let mut state = self.record("create_role");
        let arn = format!("arn:aws:iam::{}:role/{}", ACCOUNT_ID, role);
        state.roles.insert(role.to_string(), arn.clone());
        Ok(arn)
    }

    async fn put_role_policy(&self, role: &str, policy_name: &str, _document: &str) -> Result<()> {
        let mut state = self.record("put_role_policy");
        state
            .role_policies
            .insert((role.to_string(), policy_name.to_string()));
        Ok(())
    }

    async fn delete_role_policy(&self, role: &str, policy_name: &str) -> Result<()> {
        let mut state = self.record("delete_role_policy");
        if !state
            .role_policies
            .remove(&(role.to_string(), policy_name.to_string()))
        {
            return Err(missing(policy_name));
        }
        Ok(())
    }

    async fn delete_role(&self, role: &str) -> Result<()> {
        let mut state = self.record("delete_role");
        state.roles.remove(role).map(|_| ()).ok_or_else(|| missing(role))
    }

    async fn get_function_arn(&self, name: &str) -> Result<Option<String>> {
        let state = self.record("get_function_arn");
        Ok(state
            .functions
            .contains_key(name)
            .then(|| format!("arn:aws:lambda:us-west-2:{}:function:{}", ACCOUNT_ID, name)))
    }

    async fn create_function(&self, request: &FunctionRequest) -> Result<String> {
        let mut state = self.record("create_function");
        if let Some(failure) = &state.create_function_failure {
            return Err(failure());
        }
        if state.functions.contains_key(&request.name) {
            return Err(CloudError::AlreadyExists(request.name.clone()));
        }
        state.functions.insert(request.name.clone(), request.clone());
        Ok(format!("arn:aws:lambda:us-west-2:{}:function:{}", ACCOUNT_ID, request.name))
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        let mut state = self.record("delete_function");
        state.functions.remove(name).map(|_| ()).ok_or_else(|| missing(name))
    }

    async fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<()> {
        let mut state = self.record("add_invoke_permission");
        let key = (function_name(&permission.function), permission.statement_id.clone());
        if !state.permissions.insert(key) {
            return Err(CloudError::AlreadyExists(permission.statement_id.clone()));
        }
        Ok(())
    }

    async fn remove_invoke_permission(&self, function: &str, statement_id: &str) -> Result<()> {
        let mut state = self.record("remove_invoke_permission");
        if !state
            .permissions
            .remove(&(function_name(function), statement_id.to_string()))
        {
            return Err(missing(statement_id));
        }
        Ok(())
    }
}

/// Functions are addressed by ARN or by name; key permissions by name.
fn function_name(function: &str) -> String {
    function.rsplit(':').next().unwrap_or(function).to_string()
}

#[async_trait]
impl GatewayApi for FakeCloud {
    async fn list_rest_apis(&self, next_token: Option<String>) -> Result<Page<NamedResource>> {
        let apis = self
            .record("list_rest_apis")
            .apis
            .iter()
            .map(|a| NamedResource::new(&a.name, &a.id))
            .collect();
        paginate(apis, next_token)
    }

    async fn create_rest_api(&self, name: &str) -> Result<String> {
        let mut state = self.record("create_rest_api");
        let id = state.next_id("api");
        let root = state.next_id("root");
        state.apis.push(FakeApi {
            name: name.to_string(),
            id: id.clone(),
            resources: vec![ApiResource {
                id: root,
                path: "/".to_string(),
            }],
            deployments: Vec::new(),
        });
        Ok(id)
    }

    async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        let mut state = self.record("delete_rest_api");
        if state.stale_listings {
            return Ok(());
        }
        let before = state.apis.len();
        state.apis.retain(|a| a.id != api_id);
        if state.apis.len() == before {
            return Err(missing(api_id));
        }
        Ok(())
    }

    async fn create_authorizer(&self, request: &AuthorizerRequest) -> Result<String> {
        let mut state = self.record("create_authorizer");
        let id = state.next_id("authorizer");
        state.authorizers.push((id.clone(), request.clone()));
        Ok(id)
    }

    async fn get_resources(&self, api_id: &str) -> Result<Vec<ApiResource>> {
        let state = self.record("get_resources");
        state
            .apis
            .iter()
            .find(|a| a.id == api_id)
            .map(|a| a.resources.clone())
            .ok_or_else(|| missing(api_id))
    }

    async fn create_resource(
        &self,
        api_id: &str,
        _parent_id: &str,
        path_part: &str,
    ) -> Result<String> {
        let mut state = self.record("create_resource");
        let id = state.next_id("resource");
        let api = state
            .apis
            .iter_mut()
            .find(|a| a.id == api_id)
            .ok_or_else(|| missing(api_id))?;
        api.resources.push(ApiResource {
            id: id.clone(),
            path: format!("/{}", path_part),
        });
        Ok(id)
    }

    async fn put_method(&self, request: &MethodRequest) -> Result<()> {
        self.record("put_method").methods.push(request.clone());
        Ok(())
    }

    async fn put_integration(
        &self,
        _api_id: &str,
        _resource_id: &str,
        _http_method: &str,
        _uri: &str,
    ) -> Result<()> {
        self.record("put_integration");
        Ok(())
    }

    async fn put_integration_response(
        &self,
        _api_id: &str,
        _resource_id: &str,
        _http_method: &str,
        _status_code: &str,
        _selection_pattern: &str,
    ) -> Result<()> {
        self.record("put_integration_response");
        Ok(())
    }

    async fn put_method_response(
        &self,
        _api_id: &str,
        _resource_id: &str,
        _http_method: &str,
        _status_code: &str,
    ) -> Result<()> {
        self.record("put_method_response");
        Ok(())
    }

    async fn create_deployment(&self, api_id: &str, stage_name: &str) -> Result<String> {
        let mut state = self.record("create_deployment");
        let id = state.next_id("deployment");
        let api = state
            .apis
            .iter_mut()
            .find(|a| a.id == api_id)
            .ok_or_else(|| missing(api_id))?;
        api.deployments.push(stage_name.to_string());
        Ok(id)
    }

    async fn account_id(&self) -> Result<String> {
        self.record("account_id");
        Ok(ACCOUNT_ID.to_string())
    }
}

/// Stage config with every name derived from `prefix`.
pub fn stage(prefix: &str) -> StageConfig {
    StageConfig::resolve(StageOverrides {
        prefix: Some(prefix.to_string()),
        ..Default::default()
    })
    .unwrap()
}

/// Orchestrator over `fake` with zero delays.
pub fn orchestrator(fake: &Arc<FakeCloud>, config: StageConfig) -> StageOrchestrator {
    let ctx = ProvisionContext::new(config, ProviderClients::from_backend(fake.clone()))
        .with_poll(PollConfig {
            interval: Duration::ZERO,
            max_attempts: 50,
        })
        .with_retry(RetryConfig {
            max_attempts: 10,
            delay: Duration::ZERO,
        });
    StageOrchestrator::new(ctx)
}
