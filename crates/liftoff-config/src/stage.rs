//! Stage configuration
//!
//! A [`StageConfig`] carries the human-chosen name of every resource Liftoff
//! manages plus the per-kind parameters used to create them. It is resolved
//! once at startup from layered [`StageOverrides`] (CLI flags, environment,
//! config file) and is read-only afterwards.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Token replaced with the resolved prefix in every string setting.
pub const PREFIX_TOKEN: &str = "[prefix]";

/// Prefix used when no layer sets one.
pub const DEFAULT_PREFIX: &str = "test1";

/// A single setting value that can be prefix-expanded and printed.
trait Setting: Sized {
    fn expand(self, prefix: &str) -> Self;
    fn render(&self) -> String;
    fn is_blank(&self) -> bool;
}

impl Setting for String {
    fn expand(self, prefix: &str) -> Self {
        self.replace(PREFIX_TOKEN, prefix)
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Setting for u16 {
    fn expand(self, _prefix: &str) -> Self {
        self
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn is_blank(&self) -> bool {
        *self == 0
    }
}

impl Setting for Option<PathBuf> {
    fn expand(self, prefix: &str) -> Self {
        self.map(|path| PathBuf::from(path.to_string_lossy().replace(PREFIX_TOKEN, prefix)))
    }

    fn render(&self) -> String {
        match self {
            Some(path) => path.display().to_string(),
            None => "(embedded)".to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        false
    }
}

macro_rules! stage_settings {
    ($( $(#[doc = $doc:literal])* $field:ident : $ty:ty = $default:expr; )+) => {
        /// Resolved names and parameters for every managed resource.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct StageConfig {
            $( $(#[doc = $doc])* pub $field: $ty, )+
        }

        /// One configuration layer; unset fields fall through to lower layers.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct StageOverrides {
            $( $(#[doc = $doc])* #[serde(default)] pub $field: Option<$ty>, )+
        }

        impl StageOverrides {
            /// Layer `self` over `lower`. Fields set in `self` win.
            pub fn over(self, lower: StageOverrides) -> StageOverrides {
                StageOverrides {
                    $( $field: self.$field.or(lower.$field), )+
                }
            }
        }

        impl StageConfig {
            fn from_layer(layer: StageOverrides, prefix: &str) -> Self {
                Self {
                    $( $field: layer.$field.unwrap_or_else(|| $default).expand(prefix), )+
                }
            }

            /// Every setting as a `(key, value)` pair, in declaration order.
            pub fn entries(&self) -> Vec<(&'static str, String)> {
                vec![ $( (stringify!($field), self.$field.render()), )+ ]
            }

            fn blank_keys(&self) -> Vec<&'static str> {
                let mut blank = Vec::new();
                $( if self.$field.is_blank() { blank.push(stringify!($field)); } )+
                blank
            }
        }
    };
}

stage_settings! {
    /// Naming prefix substituted for `[prefix]` in every other setting
    prefix: String = DEFAULT_PREFIX.to_string();

    /// Build name (visible in the GameLift console)
    build_name: String = "[prefix]-build".to_string();
    /// Build version label
    build_version: String = "build0.42".to_string();
    /// Operating system installed on fleet instances
    build_os: String = "WINDOWS_2012".to_string();
    /// Local path of the packaged server build
    build_root: String = "E:/unreal_projects/MyProject/x64 Builds/WindowsServer".to_string();

    /// Fleet name
    fleet_name: String = "[prefix]-fleet".to_string();
    /// Server executable path on the instance; must start with C:/game
    fleet_launch_path: String = "C:/game/MyProject/Binaries/Win64/MyProjectServer.exe".to_string();
    /// EC2 instance type for the fleet
    fleet_instance_type: String = "c5.large".to_string();
    /// UDP port opened to all sources for game sessions
    fleet_session_port: u16 = 7777;

    /// Identity pool name
    user_pool_name: String = "[prefix]-user-pool".to_string();
    /// Login app client name
    user_pool_client_name: String = "[prefix]-user-pool-login-client".to_string();
    /// Hosted UI subdomain
    user_pool_subdomain: String = "[prefix]-login".to_string();

    /// Login function name
    lambda_login_name: String = "[prefix]-lambda-login".to_string();
    /// Start-session function name
    lambda_start_session_name: String = "[prefix]-lambda-start-session".to_string();
    /// Execution role of the login function
    lambda_login_role: String = "[prefix]-lambda-cognito-role".to_string();
    /// Execution role of the start-session function
    lambda_session_role: String = "[prefix]-lambda-session-role".to_string();
    /// Inline policy attached to the login role
    lambda_login_policy: String = "[prefix]-lambda-cognito-policy".to_string();
    /// Inline policy attached to the start-session role
    lambda_session_policy: String = "[prefix]-lambda-session-policy".to_string();
    /// Function runtime identifier
    lambda_runtime: String = "python3.12".to_string();
    /// Replacement source template for the login function
    login_source: Option<PathBuf> = None;
    /// Replacement source template for the start-session function
    session_source: Option<PathBuf> = None;

    /// REST API name
    rest_api_name: String = "[prefix]-rest-api".to_string();
    /// Deployment stage name
    rest_api_stage_name: String = "[prefix]-api-test-stage".to_string();
    /// Path segment bound to the login function
    rest_api_login_path: String = "login".to_string();
    /// Path segment bound to the start-session function
    rest_api_start_session_path: String = "startsession".to_string();
    /// Authorizer name
    rest_api_authorizer_name: String = "[prefix]-cognito-authorizer".to_string();

    /// AWS credentials profile
    profile: String = "default".to_string();
    /// AWS region
    region: String = "us-west-2".to_string();
}

impl StageConfig {
    /// Resolve the final configuration from an already layered set of overrides.
    ///
    /// The prefix is resolved first and then substituted into every setting.
    pub fn resolve(layer: StageOverrides) -> Result<Self> {
        let prefix = layer
            .prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if prefix.contains(PREFIX_TOKEN) {
            return Err(ConfigError::Invalid(format!(
                "prefix must not contain {}",
                PREFIX_TOKEN
            )));
        }

        let config = Self::from_layer(layer, &prefix);
        let blank = config.blank_keys();
        if !blank.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "empty value for: {}",
                blank.join(", ")
            )));
        }

        Ok(config)
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::from_layer(StageOverrides::default(), DEFAULT_PREFIX)
    }
}
