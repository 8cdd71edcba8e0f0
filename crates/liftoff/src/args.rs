use clap::Args;
use liftoff_cloud::PollConfig;
use liftoff_config::StageOverrides;
use std::path::PathBuf;
use std::time::Duration;

/// Stage settings accepted on the command line (or as `LIFTOFF_*` variables).
///
/// Every value may contain `[prefix]`, which is replaced with the resolved prefix.
#[derive(Args, Debug, Default, Clone)]
pub struct StageArgs {
    /// Naming prefix for every default resource name
    #[arg(long, global = true, env = "LIFTOFF_PREFIX")]
    pub prefix: Option<String>,

    /// Build name
    #[arg(long, global = true, env = "LIFTOFF_BUILD_NAME")]
    pub build_name: Option<String>,
    /// Build version label
    #[arg(long, global = true, env = "LIFTOFF_BUILD_VERSION")]
    pub build_version: Option<String>,
    /// Operating system of the build (e.g. WINDOWS_2012)
    #[arg(long, global = true, env = "LIFTOFF_BUILD_OS")]
    pub build_os: Option<String>,
    /// Local directory holding the packaged server build
    #[arg(long, global = true, env = "LIFTOFF_BUILD_ROOT")]
    pub build_root: Option<String>,

    /// Fleet name
    #[arg(long, global = true, env = "LIFTOFF_FLEET_NAME")]
    pub fleet_name: Option<String>,
    /// Server executable path on the fleet instances
    #[arg(long, global = true, env = "LIFTOFF_FLEET_LAUNCH_PATH")]
    pub fleet_launch_path: Option<String>,
    /// EC2 instance type of the fleet
    #[arg(long, global = true, env = "LIFTOFF_FLEET_INSTANCE_TYPE")]
    pub fleet_instance_type: Option<String>,
    /// UDP port opened for game sessions
    #[arg(long, global = true, env = "LIFTOFF_FLEET_SESSION_PORT")]
    pub fleet_session_port: Option<u16>,

    /// User pool name
    #[arg(long, global = true, env = "LIFTOFF_USER_POOL_NAME")]
    pub user_pool_name: Option<String>,
    /// Login app client name
    #[arg(long, global = true, env = "LIFTOFF_USER_POOL_CLIENT_NAME")]
    pub user_pool_client_name: Option<String>,
    /// Hosted login UI subdomain
    #[arg(long, global = true, env = "LIFTOFF_USER_POOL_SUBDOMAIN")]
    pub user_pool_subdomain: Option<String>,

    /// Login function name
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_LOGIN_NAME")]
    pub lambda_login_name: Option<String>,
    /// Start-session function name
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_START_SESSION_NAME")]
    pub lambda_start_session_name: Option<String>,
    /// Execution role of the login function
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_LOGIN_ROLE")]
    pub lambda_login_role: Option<String>,
    /// Execution role of the start-session function
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_SESSION_ROLE")]
    pub lambda_session_role: Option<String>,
    /// Inline policy of the login role
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_LOGIN_POLICY")]
    pub lambda_login_policy: Option<String>,
    /// Inline policy of the start-session role
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_SESSION_POLICY")]
    pub lambda_session_policy: Option<String>,
    /// Function runtime
    #[arg(long, global = true, env = "LIFTOFF_LAMBDA_RUNTIME")]
    pub lambda_runtime: Option<String>,
    /// Replacement source for the login function
    #[arg(long, global = true, env = "LIFTOFF_LOGIN_SOURCE")]
    pub login_source: Option<PathBuf>,
    /// Replacement source for the start-session function
    #[arg(long, global = true, env = "LIFTOFF_SESSION_SOURCE")]
    pub session_source: Option<PathBuf>,

    /// REST API name
    #[arg(long, global = true, env = "LIFTOFF_REST_API_NAME")]
    pub rest_api_name: Option<String>,
    /// Deployment stage name
    #[arg(long, global = true, env = "LIFTOFF_REST_API_STAGE_NAME")]
    pub rest_api_stage_name: Option<String>,
    /// Path segment of the login route
    #[arg(long, global = true, env = "LIFTOFF_REST_API_LOGIN_PATH")]
    pub rest_api_login_path: Option<String>,
    /// Path segment of the start-session route
    #[arg(long, global = true, env = "LIFTOFF_REST_API_START_SESSION_PATH")]
    pub rest_api_start_session_path: Option<String>,
    /// Authorizer name
    #[arg(long, global = true, env = "LIFTOFF_REST_API_AUTHORIZER_NAME")]
    pub rest_api_authorizer_name: Option<String>,

    /// AWS credentials profile
    #[arg(long, global = true, env = "LIFTOFF_PROFILE")]
    pub profile: Option<String>,
    /// AWS region
    #[arg(long, global = true, env = "LIFTOFF_REGION")]
    pub region: Option<String>,
}

impl StageArgs {
    /// The command-line layer of the stage configuration.
    pub fn to_overrides(&self) -> StageOverrides {
        let args = self.clone();
        StageOverrides {
            prefix: args.prefix,
            build_name: args.build_name,
            build_version: args.build_version,
            build_os: args.build_os,
            build_root: args.build_root,
            fleet_name: args.fleet_name,
            fleet_launch_path: args.fleet_launch_path,
            fleet_instance_type: args.fleet_instance_type,
            fleet_session_port: args.fleet_session_port,
            user_pool_name: args.user_pool_name,
            user_pool_client_name: args.user_pool_client_name,
            user_pool_subdomain: args.user_pool_subdomain,
            lambda_login_name: args.lambda_login_name,
            lambda_start_session_name: args.lambda_start_session_name,
            lambda_login_role: args.lambda_login_role,
            lambda_session_role: args.lambda_session_role,
            lambda_login_policy: args.lambda_login_policy,
            lambda_session_policy: args.lambda_session_policy,
            lambda_runtime: args.lambda_runtime,
            login_source: args.login_source.map(Some),
            session_source: args.session_source.map(Some),
            rest_api_name: args.rest_api_name,
            rest_api_stage_name: args.rest_api_stage_name,
            rest_api_login_path: args.rest_api_login_path,
            rest_api_start_session_path: args.rest_api_start_session_path,
            rest_api_authorizer_name: args.rest_api_authorizer_name,
            profile: args.profile,
            region: args.region,
        }
    }
}

/// Readiness polling knobs.
#[derive(Args, Debug, Default, Clone)]
pub struct TimingArgs {
    /// Seconds between readiness polls
    #[arg(long, global = true, env = "LIFTOFF_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Polls before giving up with a timeout
    #[arg(long, global = true, env = "LIFTOFF_POLL_MAX_ATTEMPTS")]
    pub poll_max_attempts: Option<u32>,
}

impl TimingArgs {
    pub fn poll_config(&self) -> PollConfig {
        let defaults = PollConfig::default();
        PollConfig {
            interval: self
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            max_attempts: self.poll_max_attempts.unwrap_or(defaults.max_attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_overrides_keeps_unset_fields_empty() {
        let args = StageArgs {
            prefix: Some("demo".to_string()),
            fleet_session_port: Some(7778),
            login_source: Some(PathBuf::from("login.py")),
            ..Default::default()
        };

        let overrides = args.to_overrides();
        assert_eq!(overrides.prefix.as_deref(), Some("demo"));
        assert_eq!(overrides.fleet_session_port, Some(7778));
        assert_eq!(overrides.login_source, Some(Some(PathBuf::from("login.py"))));
        assert_eq!(overrides.session_source, None);
        assert_eq!(overrides.region, None);
    }

    #[test]
    fn test_poll_config_defaults() {
        let timing = TimingArgs::default();
        assert_eq!(timing.poll_config(), PollConfig::default());

        let timing = TimingArgs {
            poll_interval_secs: Some(5),
            poll_max_attempts: None,
        };
        let poll = timing.poll_config();
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.max_attempts, 600);
    }
}
