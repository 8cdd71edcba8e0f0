//! Resource Locator
//!
//! Finds the provider-assigned id of a resource by its configured name. The
//! provider offers no server-side name filter for builds, fleets, pools,
//! clients or APIs, so listings are scanned page by page for an exact match.
//! The first match wins.

use crate::error::{CloudError, Result};
use crate::provider::ProviderClients;
use crate::resource::{NamedResource, Page, ResourceHandle, ResourceKind};
use liftoff_config::StageConfig;
use std::collections::HashSet;
use std::future::Future;

/// Scan a paginated listing for `name` and return the first match's id.
pub async fn find_in_pages<F, Fut>(name: &str, fetch: F) -> Result<Option<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<NamedResource>>>,
{
    find_in_pages_excluding(name, &HashSet::new(), fetch).await
}

/// Like [`find_in_pages`], but ids in `skip` never match.
///
/// Delete loops pass the ids they already removed so a listing that still
/// shows them moves on to the next duplicate.
pub async fn find_in_pages_excluding<F, Fut>(
    name: &str,
    skip: &HashSet<String>,
    mut fetch: F,
) -> Result<Option<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<NamedResource>>>,
{
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        if let Some(found) = page
            .items
            .into_iter()
            .find(|item| item.name == name && !skip.contains(&item.id))
        {
            return Ok(Some(found.id));
        }
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(None),
        }
    }
}

/// Turn a lookup miss into a NotFound error.
pub fn require(what: &str, name: &str, id: Option<String>) -> Result<String> {
    id.ok_or_else(|| CloudError::not_found(what, name))
}

/// Name-based lookups over the provider clients.
#[derive(Clone)]
pub struct ResourceLocator {
    clients: ProviderClients,
}

impl ResourceLocator {
    pub fn new(clients: ProviderClients) -> Self {
        Self { clients }
    }

    /// Locate a resource of `kind` by name.
    ///
    /// For [`ResourceKind::Lambdas`] the name is a function name.
    pub async fn find(&self, kind: ResourceKind, name: &str) -> Result<Option<String>> {
        match kind {
            ResourceKind::Build => self.build_id(name).await,
            ResourceKind::Fleet => self.fleet_id(name).await,
            ResourceKind::UserPool => self.user_pool_id(name).await,
            ResourceKind::Lambdas => self.function_arn(name).await,
            ResourceKind::RestApi => self.rest_api_id(name).await,
        }
    }

    /// Handles for every resource `kind` is made of, located by their configured names.
    pub async fn locate(
        &self,
        kind: ResourceKind,
        config: &StageConfig,
    ) -> Result<Vec<ResourceHandle>> {
        let names: Vec<&str> = match kind {
            ResourceKind::Build => vec![config.build_name.as_str()],
            ResourceKind::Fleet => vec![config.fleet_name.as_str()],
            ResourceKind::UserPool => vec![config.user_pool_name.as_str()],
            ResourceKind::Lambdas => vec![
                config.lambda_login_name.as_str(),
                config.lambda_start_session_name.as_str(),
            ],
            ResourceKind::RestApi => vec![config.rest_api_name.as_str()],
        };

        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            let id = self.find(kind, name).await?;
            handles.push(ResourceHandle::new(kind, name).located(id));
        }
        Ok(handles)
    }

    pub async fn build_id(&self, name: &str) -> Result<Option<String>> {
        self.build_id_excluding(name, &HashSet::new()).await
    }

    /// First build named `name` whose id is not in `skip`.
    pub async fn build_id_excluding(
        &self,
        name: &str,
        skip: &HashSet<String>,
    ) -> Result<Option<String>> {
        let fleets = &self.clients.fleets;
        find_in_pages_excluding(name, skip, move |token| fleets.list_builds(token)).await
    }

    pub async fn fleet_id(&self, name: &str) -> Result<Option<String>> {
        let fleets = &self.clients.fleets;
        find_in_pages(name, move |token| fleets.list_fleets(token)).await
    }

    pub async fn user_pool_id(&self, name: &str) -> Result<Option<String>> {
        let identity = &self.clients.identity;
        find_in_pages(name, move |token| identity.list_user_pools(token)).await
    }

    pub async fn user_pool_arn(&self, name: &str) -> Result<Option<String>> {
        match self.user_pool_id(name).await? {
            Some(pool_id) => {
                let details = self.clients.identity.describe_user_pool(&pool_id).await?;
                Ok(Some(details.arn))
            }
            None => Ok(None),
        }
    }

    /// Client id of `client_name` inside the pool named `pool_name`.
    pub async fn app_client_id(&self, pool_name: &str, client_name: &str) -> Result<Option<String>> {
        let Some(pool_id) = self.user_pool_id(pool_name).await? else {
            tracing::debug!("Pool {} not found while looking up client {}", pool_name, client_name);
            return Ok(None);
        };
        let identity = &self.clients.identity;
        let pool_id = pool_id.as_str();
        find_in_pages(client_name, move |token| identity.list_app_clients(pool_id, token)).await
    }

    pub async fn role_arn(&self, role: &str) -> Result<Option<String>> {
        self.clients.functions.get_role_arn(role).await
    }

    pub async fn function_arn(&self, name: &str) -> Result<Option<String>> {
        self.clients.functions.get_function_arn(name).await
    }

    pub async fn rest_api_id(&self, name: &str) -> Result<Option<String>> {
        self.rest_api_id_excluding(name, &HashSet::new()).await
    }

    /// First REST API named `name` whose id is not in `skip`.
    pub async fn rest_api_id_excluding(
        &self,
        name: &str,
        skip: &HashSet<String>,
    ) -> Result<Option<String>> {
        let gateway = &self.clients.gateway;
        find_in_pages_excluding(name, skip, move |token| gateway.list_rest_apis(token)).await
    }
}
