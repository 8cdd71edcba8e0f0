mod common;

use common::{ACCOUNT_ID, FakeCloud, orchestrator, stage};
use liftoff_cloud::package::HANDLER_FILE;
use liftoff_cloud::provision::{TEST_USER_COUNT, statement_id};
use liftoff_cloud::{CloudError, ResourceKind, Verb};
use std::io::{Cursor, Read};

fn unzip_handler(package: Vec<u8>) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = archive.by_name(HANDLER_FILE).unwrap();
    let mut source = String::new();
    file.read_to_string(&mut source).unwrap();
    source
}

#[tokio::test]
async fn test_create_fleet_is_idempotent() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    let first = stage.run(Verb::Create, &["fleet"]).await;
    let second = stage.run(Verb::Create, &["fleet"]).await;

    assert!(first.is_success());
    assert!(second.is_success());
    assert!(second.succeeded[0].message.contains("already exists"));
    assert_eq!(fake.calls("create_fleet"), 1);
    assert_eq!(fake.state().fleets.len(), 1);
}

#[tokio::test]
async fn test_create_user_pool_is_idempotent() {
    let fake = FakeCloud::new();
    let stage = orchestrator(&fake, stage("demo"));

    assert!(stage.run(Verb::Create, &["user_pool"]).await.is_success());
    assert!(stage.run(Verb::Create, &["user_pool"]).await.is_success());

    assert_eq!(fake.calls("create_user_pool"), 1);
    assert_eq!(fake.calls("create_app_client"), 1);
    assert_eq!(fake.calls("create_user"), TEST_USER_COUNT);
    assert_eq!(fake.calls("set_permanent_password"), TEST_USER_COUNT);

    let state = fake.state();
    assert_eq!(state.pools.len(), 1);
    assert_eq!(state.pools[0].domain.as_deref(), Some("demo-login"));
    assert_eq!(state.pools[0].users.last().map(String::as_str), Some("user31"));
}

#[tokio::test]
async fn test_create_rest_api_is_idempotent() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    let setup = stage
        .run(Verb::Create, &["fleet", "user_pool", "lambdas"])
        .await;
    assert!(setup.is_success(), "{:?}", setup.failed);

    assert!(stage.run(Verb::Create, &["rest_api"]).await.is_success());
    assert!(stage.run(Verb::Create, &["rest_api"]).await.is_success());

    assert_eq!(fake.calls("create_rest_api"), 1);
    assert_eq!(fake.calls("create_deployment"), 1);

    let state = fake.state();
    assert_eq!(state.apis.len(), 1);
    assert_eq!(state.apis[0].deployments, vec!["demo-api-test-stage".to_string()]);
    let paths: Vec<&str> = state.apis[0].resources.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/", "/login", "/startsession"]);
}

#[tokio::test]
async fn test_fleet_without_build_is_not_found() {
    let fake = FakeCloud::new();
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleet"]).await;

    assert!(!report.is_success());
    assert_eq!(report.failed[0].kind, ResourceKind::Fleet);
    assert!(report.failed[0].error.as_deref().unwrap().contains("demo-build"));
    assert_eq!(report.exit_code(), 3);
    assert_eq!(fake.calls("create_fleet"), 0);
    assert_eq!(fake.calls("build_status"), 0);
}

#[tokio::test]
async fn test_fleet_waits_for_ready_build() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    fake.script_build_statuses(&["INITIALIZED", "INITIALIZED", "INITIALIZED"]);
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleet"]).await;

    assert!(report.is_success());
    assert_eq!(fake.calls("build_status"), 4);
    let state = fake.state();
    let last_status = state.calls.iter().rposition(|c| c == "build_status").unwrap();
    let create = state.calls.iter().position(|c| c == "create_fleet").unwrap();
    assert!(last_status < create);
}

#[tokio::test]
async fn test_failed_build_stops_fleet_creation() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    fake.script_build_statuses(&["INITIALIZED", "FAILED"]);
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleet"]).await;

    assert!(!report.is_success());
    assert_eq!(fake.calls("build_status"), 2);
    assert_eq!(fake.calls("create_fleet"), 0);
}

#[tokio::test]
async fn test_function_retry_is_bounded() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));
    assert!(stage.run(Verb::Create, &["fleet", "user_pool"]).await.is_success());

    fake.fail_create_function(|| {
        CloudError::PropagationDelay("The role defined for the function cannot be assumed".into())
    });
    let report = stage.run(Verb::Create, &["lambdas"]).await;

    assert!(!report.is_success());
    assert_eq!(fake.calls("create_function"), 10);
    assert_eq!(report.exit_code(), 6);
    assert!(report.failed[0].error.as_deref().unwrap().contains("10 attempts"));
}

#[tokio::test]
async fn test_create_lambdas_is_idempotent() {
    let fake = FakeCloud::new();
    fake.seed_fleet("demo-fleet");
    let stage = orchestrator(&fake, stage("demo"));
    assert!(stage.run(Verb::Create, &["user_pool"]).await.is_success());

    let first = stage.run(Verb::Create, &["lambdas"]).await;
    let second = stage.run(Verb::Create, &["lambdas"]).await;

    assert!(first.is_success(), "{:?}", first.failed);
    assert!(second.is_success(), "{:?}", second.failed);
    assert!(second.failed.is_empty());
    assert_eq!(fake.calls("create_function"), 4);
    assert_eq!(fake.state().functions.len(), 2);
}

#[tokio::test]
async fn test_login_package_carries_client_id() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage
        .run(Verb::Create, &["fleet", "user_pool", "lambdas"])
        .await;
    assert!(report.is_success(), "{:?}", report.failed);

    let client_id = fake.client_id("demo-user-pool").unwrap();
    let source = unzip_handler(fake.function_package("demo-lambda-login").unwrap());
    assert!(source.contains(&format!("USER_POOL_APP_CLIENT_ID = \"{}\"", client_id)));
    assert!(!source.contains("USER_POOL_APP_CLIENT_ID = ''"));

    let fleet_id = fake.state().fleets[0].id.clone();
    let source = unzip_handler(fake.function_package("demo-lambda-start-session").unwrap());
    assert!(source.contains(&format!("GAMELIFT_FLEET_ID = \"{}\"", fleet_id)));
}

#[tokio::test]
async fn test_delete_build_removes_duplicates() {
    let fake = FakeCloud::new();
    fake.seed_noise(3);
    for _ in 0..3 {
        fake.seed_build("demo-build");
    }
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Delete, &["build"]).await;

    assert!(report.is_success());
    assert_eq!(fake.calls("delete_build"), 3);
    let located = stage.status(&["build"]).await.unwrap();
    assert!(!located[0].is_located());
    assert_eq!(fake.state().builds.len(), 3);
}

#[tokio::test]
async fn test_delete_build_keeps_scanning_stale_listing() {
    let fake = FakeCloud::new();
    for _ in 0..3 {
        fake.seed_build("demo-build");
    }
    fake.keep_deleted_listed();
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Delete, &["build"]).await;

    assert!(report.is_success(), "{:?}", report.failed);
    assert_eq!(fake.calls("delete_build"), 3);
    assert!(report.succeeded[0].message.contains("3 build(s)"));
}

#[tokio::test]
async fn test_fleet_limit_is_not_retried() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    fake.fail_create_fleet(|| CloudError::LimitExceeded("fleet count limit reached".into()));
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleet"]).await;

    assert!(!report.is_success());
    assert_eq!(fake.calls("create_fleet"), 1);
    assert_eq!(report.exit_code(), 4);
    assert_eq!(report.failed[0].kind, ResourceKind::Fleet);
    assert!(report.failed[0].error.as_deref().unwrap().contains("Hint"));
}

#[tokio::test]
async fn test_create_then_delete_fleet_end_to_end() {
    let fake = FakeCloud::new();
    fake.seed_noise(5);
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    assert!(stage.run(Verb::Create, &["fleet"]).await.is_success());
    let located = stage.status(&["fleet"]).await.unwrap();
    assert_eq!(located[0].name, "demo-fleet");
    assert!(located[0].is_located());

    assert!(stage.run(Verb::Delete, &["fleet"]).await.is_success());
    assert_eq!(fake.calls("delete_fleet"), 1);

    let located = stage.status(&["fleet"]).await.unwrap();
    assert!(!located[0].is_located());
    assert_eq!(fake.state().fleets.len(), 5);
}

#[tokio::test]
async fn test_unknown_tokens_are_skipped() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleets", "fleet"]).await;

    assert!(report.is_success());
    assert_eq!(report.skipped, vec!["fleets".to_string()]);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_failed_kind_does_not_stop_the_run() {
    let fake = FakeCloud::new();
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Create, &["fleet", "user_pool"]).await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].kind, ResourceKind::UserPool);
    assert_eq!(report.exit_code(), 3);
}

#[tokio::test]
async fn test_rest_api_requires_functions_before_creating() {
    let fake = FakeCloud::new();
    let stage = orchestrator(&fake, stage("demo"));
    assert!(stage.run(Verb::Create, &["user_pool"]).await.is_success());

    let report = stage.run(Verb::Create, &["rest_api"]).await;

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 3);
    assert_eq!(fake.calls("create_rest_api"), 0);
}

#[tokio::test]
async fn test_create_all_then_delete_all() {
    let fake = FakeCloud::new();
    let stage = orchestrator(&fake, stage("demo"));

    let created = stage.run(Verb::Create, &["all"]).await;
    assert!(created.is_success(), "{:?}", created.failed);
    assert_eq!(created.succeeded.len(), 5);
    assert_eq!(fake.state().permissions.len(), 2);

    let deleted = stage.run(Verb::Delete, &["all"]).await;
    assert!(deleted.is_success(), "{:?}", deleted.failed);

    let state = fake.state();
    assert!(state.builds.is_empty());
    assert!(state.fleets.is_empty());
    assert!(state.pools.is_empty());
    assert!(state.functions.is_empty());
    assert!(state.roles.is_empty());
    assert!(state.role_policies.is_empty());
    assert!(state.apis.is_empty());
    assert!(state.permissions.is_empty());
}

#[tokio::test]
async fn test_rest_api_method_authorization() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage
        .run(Verb::Create, &["fleet", "user_pool", "lambdas", "rest_api"])
        .await;
    assert!(report.is_success(), "{:?}", report.failed);

    let pool_id = fake.state().pools[0].id.clone();
    let (authorizer_id, authorizer) = fake.state().authorizers[0].clone();
    assert_eq!(authorizer.name, "demo-cognito-authorizer");
    assert_eq!(
        authorizer.provider_arn,
        format!("arn:aws:cognito-idp:us-west-2:{}:userpool/{}", ACCOUNT_ID, pool_id)
    );
    assert_eq!(authorizer.identity_source, "method.request.header.Authorization");

    let methods = fake.state().methods.clone();
    assert_eq!(methods.len(), 2);
    for method in &methods {
        match fake.method_path(method).as_deref() {
            Some("/login") => {
                assert_eq!(method.http_method, "POST");
                assert_eq!(method.authorizer_id, None);
            }
            Some("/startsession") => {
                assert_eq!(method.http_method, "GET");
                assert_eq!(method.authorizer_id.as_deref(), Some(authorizer_id.as_str()));
            }
            other => panic!("method on unexpected resource {:?}", other),
        }
    }
    assert!(fake.first_call("create_authorizer") < fake.first_call("put_method"));
}

#[tokio::test]
async fn test_delete_rest_api_removes_every_duplicate() {
    let fake = FakeCloud::new();
    fake.seed_rest_api("demo-rest-api");
    fake.seed_rest_api("other-rest-api");
    fake.seed_rest_api("demo-rest-api");
    fake.seed_rest_api("demo-rest-api");
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Delete, &["rest_api"]).await;

    assert!(report.is_success(), "{:?}", report.failed);
    assert_eq!(fake.calls("delete_rest_api"), 3);
    let state = fake.state();
    assert_eq!(state.apis.len(), 1);
    assert_eq!(state.apis[0].name, "other-rest-api");
}

#[tokio::test]
async fn test_delete_rest_api_keeps_scanning_stale_listing() {
    let fake = FakeCloud::new();
    fake.seed_rest_api("demo-rest-api");
    fake.seed_rest_api("demo-rest-api");
    fake.keep_deleted_listed();
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Delete, &["rest_api"]).await;

    assert!(report.is_success(), "{:?}", report.failed);
    assert_eq!(fake.calls("delete_rest_api"), 2);
}

#[tokio::test]
async fn test_recreating_rest_api_replaces_permissions() {
    let fake = FakeCloud::new();
    fake.seed_build("demo-build");
    let stage = orchestrator(&fake, stage("demo"));
    assert!(
        stage
            .run(Verb::Create, &["fleet", "user_pool", "lambdas", "rest_api"])
            .await
            .is_success()
    );

    // Drop the API out of band; the grants stay behind on the functions.
    fake.state().apis.clear();
    assert!(stage.run(Verb::Create, &["rest_api"]).await.is_success());

    let state = fake.state();
    assert_eq!(state.permissions.len(), 2);
    assert!(state.permissions.contains(&(
        "demo-lambda-login".to_string(),
        statement_id("demo-rest-api", "login")
    )));
}

#[tokio::test]
async fn test_delete_lambdas_tolerates_partial_state() {
    let fake = FakeCloud::new();
    fake.state()
        .roles
        .insert("demo-lambda-session-role".to_string(), "arn:role".to_string());
    let stage = orchestrator(&fake, stage("demo"));

    let report = stage.run(Verb::Delete, &["lambdas"]).await;

    assert!(report.is_success(), "{:?}", report.failed);
    assert!(fake.state().roles.is_empty());
    assert_eq!(fake.calls("delete_function"), 2);
}
