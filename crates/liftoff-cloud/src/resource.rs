//! Resource kinds and handles

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five resource kinds Liftoff manages, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Uploaded server build
    Build,
    /// Compute fleet running the build
    Fleet,
    /// Identity pool with its login client, domain and test users
    UserPool,
    /// Login and start-session functions with their execution roles
    Lambdas,
    /// HTTP gateway binding both functions
    RestApi,
}

impl ResourceKind {
    /// Dependency order used for the `all` shorthand.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Build,
        ResourceKind::Fleet,
        ResourceKind::UserPool,
        ResourceKind::Lambdas,
        ResourceKind::RestApi,
    ];

    /// Command-line token for this kind
    pub fn token(&self) -> &'static str {
        match self {
            ResourceKind::Build => "build",
            ResourceKind::Fleet => "fleet",
            ResourceKind::UserPool => "user_pool",
            ResourceKind::Lambdas => "lambdas",
            ResourceKind::RestApi => "rest_api",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.token() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A named resource and the id the provider assigned to it.
///
/// `id` stays `None` until the resource is located or created. Handles are
/// never persisted; every run re-discovers ids by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub name: String,
    pub id: Option<String>,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: None,
        }
    }

    pub fn located(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn is_located(&self) -> bool {
        self.id.is_some()
    }
}

/// One entry of a provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub id: String,
}

impl NamedResource {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One page of a provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.token().parse::<ResourceKind>(), Ok(kind));
        }
        assert_eq!("lambda".parse::<ResourceKind>(), Err("lambda".to_string()));
    }

    #[test]
    fn test_handle_location() {
        let handle = ResourceHandle::new(ResourceKind::Fleet, "demo-fleet");
        assert!(!handle.is_located());

        let handle = handle.located(Some("fleet-1".to_string()));
        assert_eq!(handle.id.as_deref(), Some("fleet-1"));
    }
}
