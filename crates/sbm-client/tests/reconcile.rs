mod support;

use sbm_client::{ensure_absent, ensure_present, ClientConfig, ReconcileError, ResourceClient};
use sbm_common::{BootConfig, Machine, ResourceKind, SwitchType, TimeBetween};
use axum::http::Method;
use serde_json::json;
use support::FakeSbm;

async fn setup() -> (FakeSbm, ResourceClient) {
    let (fake, base) = FakeSbm::start().await;
    let client = ResourceClient::new(ClientConfig::new(&base).unwrap());
    (fake, client)
}

fn machine() -> Machine {
    let mut m = Machine::new("test", "testing", "testing");
    m.switch_type = SwitchType::Timed;
    m.time_between = TimeBetween::Seconds(600);
    m
}

#[tokio::test]
async fn test_present_adds_missing_record() {
    let (fake, client) = setup().await;

    let outcome = ensure_present(&client, &machine(), false).await.unwrap();
    assert!(outcome.changed);
    assert!(outcome.message.contains("added"));
    assert_eq!(fake.record("machine", "test").unwrap()["switch_type"], "timed");
}

#[tokio::test]
async fn test_present_is_idempotent() {
    let (fake, client) = setup().await;
    ensure_present(&client, &machine(), false).await.unwrap();
    let writes_before = fake.writes();

    let outcome = ensure_present(&client, &machine(), false).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(fake.writes(), writes_before);
}

#[tokio::test]
async fn test_present_updates_changed_record() {
    let (fake, client) = setup().await;
    fake.seed("boot_config", json!({ "title": "local", "config": "#!ipxe\nexit\n" }));

    let desired = BootConfig { title: "local".into(), config: "#!ipxe\nboot\n".into() };
    let outcome = ensure_present(&client, &desired, false).await.unwrap();
    assert!(outcome.changed);
    assert!(outcome.message.contains("updated"));
    assert_eq!(fake.record("boot_config", "local").unwrap()["config"], "#!ipxe\nboot\n");
}

#[tokio::test]
async fn test_check_mode_never_writes() {
    let (fake, client) = setup().await;
    fake.seed("boot_config", json!({ "title": "local", "config": "old" }));

    let desired = BootConfig { title: "local".into(), config: "new".into() };
    assert!(ensure_present(&client, &desired, true).await.unwrap().changed);

    let missing = BootConfig { title: "other".into(), config: "x".into() };
    assert!(ensure_present(&client, &missing, true).await.unwrap().changed);

    assert!(ensure_absent(&client, ResourceKind::BootConfig, "local", true).await.unwrap().changed);

    assert_eq!(fake.writes(), 0);
    assert_eq!(fake.record("boot_config", "local").unwrap()["config"], "old");
}

#[tokio::test]
async fn test_absent_removes_and_is_idempotent() {
    let (fake, client) = setup().await;
    fake.seed("variable", json!({ "key": "testvar", "value": "#!ipxe\n" }));

    let outcome = ensure_absent(&client, ResourceKind::Variable, "testvar", false).await.unwrap();
    assert!(outcome.changed);
    assert!(fake.record("variable", "testvar").is_none());

    let outcome = ensure_absent(&client, ResourceKind::Variable, "testvar", false).await.unwrap();
    assert!(!outcome.changed);
}

#[tokio::test]
async fn test_api_failure_is_propagated() {
    let (fake, client) = setup().await;
    fake.fail_next(403, r#"{"err": "database is locked"}"#);

    let err = ensure_absent(&client, ResourceKind::Machine, "test", false).await.unwrap_err();
    match err {
        ReconcileError::Api(api) => assert_eq!(api.status(), Some(403)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_update_echoing_other_data_fails_verification() {
    let (fake, client) = setup().await;
    fake.seed("boot_config", json!({ "title": "local", "config": "#!ipxe\nexit\n" }));
    fake.answer_next(
        Method::POST,
        "/api/v1/boot_config/local/",
        200,
        r##"{"title": "local", "config": "#!ipxe\nshell\n"}"##,
    );

    let desired = BootConfig { title: "local".into(), config: "#!ipxe\nboot\n".into() };
    let err = ensure_present(&client, &desired, false).await.unwrap_err();
    match err {
        ReconcileError::Verification { kind, key, reason } => {
            assert_eq!(kind, ResourceKind::BootConfig);
            assert_eq!(key, "local");
            assert_eq!(reason, "updated data not as expected");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_add_missing_from_listing_fails_verification() {
    let (fake, client) = setup().await;
    fake.answer_next(Method::PUT, "/api/v1/machine/", 200, r#""other""#);

    let err = ensure_present(&client, &machine(), false).await.unwrap_err();
    assert!(
        matches!(&err, ReconcileError::Verification { key, .. } if key == "test"),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_add_read_back_differs_fails_verification() {
    let (fake, client) = setup().await;
    fake.answer_next(
        Method::GET,
        "/api/v1/machine/test/",
        200,
        r#"{"hostname": "test", "default_boot": "local", "alternate_boot": "testing", "switch_type": "timed", "time_between": 600}"#,
    );

    let err = ensure_present(&client, &machine(), false).await.unwrap_err();
    match err {
        ReconcileError::Verification { reason, .. } => assert_eq!(reason, "added data not as expected"),
        other => panic!("unexpected error: {:?}", other),
    }
}
