//! Identity pool provisioner
//!
//! Creates the pool, its public login client, the hosted domain and a fixed
//! batch of test accounts. A failure part way through the user batch is not
//! rolled back; `delete user_pool` removes everything.

use super::{ProvisionContext, Provisioner, ignore_missing};
use crate::error::Result;
use crate::provider::{AppClientRequest, TestUser, UserPoolRequest};
use crate::resource::ResourceKind;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Number of pre-provisioned accounts (`user0` .. `user31`)
pub const TEST_USER_COUNT: usize = 32;

/// Permanent password of every test account
pub const TEST_PASSWORD: &str = "test12";

const TEST_EMAIL: &str = "test@test.com";
const MIN_PASSWORD_LENGTH: u32 = 6;
const REDIRECT_URI: &str = "https://aws.amazon.com";

/// Hosted UI sign-up/login URL for the login client.
pub fn hosted_login_url(subdomain: &str, region: &str, client_id: &str) -> String {
    format!(
        "https://{}.auth.{}.amazoncognito.com/login?client_id={}&response_type=Token&scope=email+openid&redirect_uri={}",
        subdomain, region, client_id, REDIRECT_URI
    )
}

/// `user0` .. `user31`
pub fn test_users() -> Vec<TestUser> {
    (0..TEST_USER_COUNT)
        .map(|i| TestUser {
            username: format!("user{}", i),
            email: TEST_EMAIL.to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .collect()
}

pub struct IdentityPoolProvisioner {
    ctx: Arc<ProvisionContext>,
}

impl IdentityPoolProvisioner {
    pub fn new(ctx: Arc<ProvisionContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Provisioner for IdentityPoolProvisioner {
    fn kind(&self) -> ResourceKind {
        ResourceKind::UserPool
    }

    async fn create(&self) -> Result<String> {
        let config = &self.ctx.config;
        let identity = &self.ctx.clients.identity;

        if let Some(pool_id) = self.ctx.locator().user_pool_id(&config.user_pool_name).await? {
            info!("User pool {} already exists: {}", config.user_pool_name, pool_id);
            return Ok(format!("{} already exists ({})", config.user_pool_name, pool_id));
        }

        info!("Creating user pool {}", config.user_pool_name);
        let pool_id = identity
            .create_user_pool(&UserPoolRequest {
                name: config.user_pool_name.clone(),
                min_password_length: MIN_PASSWORD_LENGTH,
                required_attribute: "email".to_string(),
                auto_verified_attributes: vec!["email".to_string()],
            })
            .await?;

        info!("Creating app client {}", config.user_pool_client_name);
        let client_id = identity
            .create_app_client(&AppClientRequest {
                pool_id: pool_id.clone(),
                name: config.user_pool_client_name.clone(),
                explicit_auth_flows: vec![
                    "ALLOW_USER_PASSWORD_AUTH".to_string(),
                    "ALLOW_REFRESH_TOKEN_AUTH".to_string(),
                ],
                oauth_flows: vec!["implicit".to_string()],
                oauth_scopes: vec!["email".to_string(), "openid".to_string()],
                redirect_uri: REDIRECT_URI.to_string(),
            })
            .await?;

        info!("Creating hosted domain {}", config.user_pool_subdomain);
        identity
            .create_domain(&pool_id, &config.user_pool_subdomain)
            .await?;
        info!(
            "Sign-up/login page: {}",
            hosted_login_url(&config.user_pool_subdomain, &config.region, &client_id)
        );

        let users = test_users();
        for user in &users {
            identity.create_user(&pool_id, user).await?;
            identity
                .set_permanent_password(&pool_id, &user.username, &user.password)
                .await?;
        }
        info!("Created {} test users (password {})", users.len(), TEST_PASSWORD);

        Ok(format!(
            "created {} ({}), client {}, {} users",
            config.user_pool_name,
            pool_id,
            client_id,
            users.len()
        ))
    }

    async fn delete(&self) -> Result<String> {
        let name = &self.ctx.config.user_pool_name;
        let identity = &self.ctx.clients.identity;

        let Some(pool_id) = self.ctx.locator().user_pool_id(name).await? else {
            info!("User pool {} not found, nothing to delete", name);
            return Ok(format!("{} not found", name));
        };

        let details = identity.describe_user_pool(&pool_id).await?;
        if let Some(domain) = details.domain {
            info!("Deleting hosted domain {}", domain);
            ignore_missing("domain", identity.delete_domain(&pool_id, &domain).await)?;
        }

        info!("Deleting user pool {} ({})", name, pool_id);
        identity.delete_user_pool(&pool_id).await?;
        Ok(format!("deleted {} ({})", name, pool_id))
    }
}
