//! End-to-end tests against a mock collector.

use std::time::Duration;

use logship::{Agent, AgentConfig, DurableStore, HostFacts, SeverityLevel};
use mockito::{Matcher, Server};
use serial_test::serial;
use tempfile::tempdir;
use tokio::time::{sleep, timeout};

fn test_config(dir: &std::path::Path) -> AgentConfig {
    AgentConfig {
        flush_interval: Duration::from_secs(3600),
        http_timeout: Duration::from_secs(2),
        print_to_console: false,
        storage_dir: dir.join("pending"),
        ..Default::default()
    }
}

async fn initialize_agent(
    server: &Server,
    dir: &std::path::Path,
) -> logship::AgentHandle {
    Agent::initialize(
        &server.url(),
        "secret-key",
        "test-app",
        test_config(dir),
        &HostFacts::new("shop", "1.2.3", "42", "com.example.shop"),
    )
    .await
    .expect("failed to initialize agent")
}

#[tokio::test]
#[serial]
async fn agent_ships_batch_with_headers_and_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/logs/batch")
        .match_header("x-api-key", "secret-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""logs":\["#.to_string()),
            Matcher::Regex(r#""message":"first""#.to_string()),
            Matcher::Regex(r#""message":"second""#.to_string()),
            Matcher::Regex(r#""level":"info""#.to_string()),
            Matcher::Regex(r#""app_id":"test-app""#.to_string()),
            Matcher::Regex(r#""app_name":"shop""#.to_string()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let dir = tempdir().expect("tempdir");
    let handle = initialize_agent(&server, dir.path()).await;

    handle.info("first", None);
    handle.info("second", None);
    handle.flush().await;

    mock.assert_async().await;
    assert_eq!(handle.queue_len().await, 0);
    handle.dispose().await;
}

#[tokio::test]
#[serial]
async fn rejected_batch_stays_queued_for_retry() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("POST", "/api/logs/batch")
        .with_status(500)
        .create_async()
        .await;

    let dir = tempdir().expect("tempdir");
    let handle = initialize_agent(&server, dir.path()).await;

    handle.warn("retry me", None);
    handle.flush().await;

    failing.assert_async().await;
    assert_eq!(handle.queue_len().await, 1);

    // Collector recovers; the same record ships on the next flush.
    let accepting = server
        .mock("POST", "/api/logs/batch")
        .match_body(Matcher::Regex(r#""message":"retry me""#.to_string()))
        .with_status(202)
        .create_async()
        .await;

    handle.flush().await;

    accepting.assert_async().await;
    assert_eq!(handle.queue_len().await, 0);
    handle.dispose().await;
}

#[tokio::test]
#[serial]
async fn unsent_records_survive_restart() {
    let dir = tempdir().expect("tempdir");

    // First life: collector down the whole time; dispose persists the queue.
    {
        let mut server = Server::new_async().await;
        let _down = server
            .mock("POST", "/api/logs/batch")
            .with_status(503)
            .create_async()
            .await;

        let handle = initialize_agent(&server, dir.path()).await;
        handle.info("recovered-1", None);
        handle.info("recovered-2", None);
        handle.dispose().await;
    }

    // The snapshot is on disk.
    {
        let store =
            DurableStore::open(dir.path().join("pending")).expect("failed to reopen store");
        let pending = store.load_and_clear().expect("failed to load snapshot");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].message, "recovered-1");
        // Put it back for the second life.
        store.save(&pending).expect("failed to re-save snapshot");
    }

    // Second life: recovery seeds the queue and the records finally ship.
    let mut server = Server::new_async().await;
    let accepting = server
        .mock("POST", "/api/logs/batch")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""message":"recovered-1""#.to_string()),
            Matcher::Regex(r#""message":"recovered-2""#.to_string()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let handle = initialize_agent(&server, dir.path()).await;
    assert_eq!(handle.queue_len().await, 2);
    handle.flush().await;

    accepting.assert_async().await;
    handle.dispose().await;

    // Nothing left on disk after a clean shutdown.
    let store = DurableStore::open(dir.path().join("pending")).expect("failed to reopen store");
    assert!(store.load_and_clear().expect("failed to load").is_empty());
}

#[tokio::test]
#[serial]
async fn error_severity_flushes_without_waiting_for_timer() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/logs/batch")
        .match_body(Matcher::Regex(r#""level":"error""#.to_string()))
        .with_status(200)
        .create_async()
        .await;

    let dir = tempdir().expect("tempdir");
    // One-hour flush interval: only the severity trigger can deliver.
    let handle = initialize_agent(&server, dir.path()).await;

    handle.log(SeverityLevel::Error, "boom", None);

    let delivered = async {
        while !mock.matched_async().await {
            sleep(Duration::from_millis(20)).await;
        }
    };
    timeout(Duration::from_secs(2), delivered)
        .await
        .expect("error record was not flushed ahead of the timer");

    handle.dispose().await;
}

#[tokio::test]
#[serial]
async fn global_facade_full_lifecycle() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/logs/batch")
        .match_header("x-api-key", "secret-key")
        .match_body(Matcher::Regex(r#""message":"via facade""#.to_string()))
        .with_status(200)
        .create_async()
        .await;

    let dir = tempdir().expect("tempdir");
    logship::global::initialize(
        &server.url(),
        "secret-key",
        "test-app",
        test_config(dir.path()),
    )
    .await
    .expect("failed to initialize global agent");
    assert!(logship::global::is_initialized());

    // A second initialize is a no-op; the running instance is kept.
    logship::global::initialize(
        "https://other.example.com",
        "other-key",
        "other-app",
        test_config(dir.path()),
    )
    .await
    .expect("repeated initialize should be a no-op");

    logship::global::info("via facade", None);
    logship::global::flush().await;
    mock.assert_async().await;

    logship::global::dispose().await;
    assert!(!logship::global::is_initialized());

    // Logging after dispose is a silent no-op.
    logship::global::error("dropped", None);
    logship::global::flush().await;
}

#[tokio::test]
#[serial]
async fn batches_drained_during_send_do_not_lose_later_records() {
    let mut server = Server::new_async().await;
    let slow_then_ok = server
        .mock("POST", "/api/logs/batch")
        .with_status(200)
        .expect_at_least(2)
        .create_async()
        .await;

    let dir = tempdir().expect("tempdir");
    let handle = initialize_agent(&server, dir.path()).await;

    handle.info("batch-one", None);
    handle.flush().await;

    // Records arriving after the first drain belong to the next flush.
    handle.info("batch-two", None);
    handle.flush().await;

    slow_then_ok.assert_async().await;
    assert_eq!(handle.queue_len().await, 0);
    handle.dispose().await;
}
