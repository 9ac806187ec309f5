//! File lookups by SHA-1 against a mock index server

mod helper;

use mockito::Server;

use helper::{START_MS, create_sqlite_registry, create_test_registry, temp_dir, write_test_files};
use ossindex_client::clock::ManualClock;
use ossindex_client::registry::hash::file_sha1;
use ossindex_client::resource::{RemoteResource, ResourceId};

const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

#[tokio::test]
async fn identifies_empty_file_and_misses_unique_file() {
    let dir = temp_dir();
    let (empty, unique) = write_test_files(dir.path());
    let unique_sha1 = file_sha1(&unique).await.unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/v1.0/sha1/{},{}", EMPTY_SHA1, unique_sha1).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 6011, "name": "empty"}, null]"#)
        .expect(1)
        .create_async()
        .await;

    let (registry, _clock) = create_test_registry(&server.url());
    let files = registry.find_file_resources(&[&empty, &unique]).await.unwrap();

    mock.assert_async().await;
    assert_eq!(files.len(), 2);

    assert!(files[0].exists());
    assert!(files[0].id().value() > 0);
    assert_eq!(files[0].name(), Some("empty"));

    assert!(!files[1].exists());
    assert_eq!(files[1].id(), ResourceId::NotFound);
    assert_eq!(files[1].name(), None);
}

#[tokio::test]
async fn single_file_lookup_wraps_object_response() {
    let dir = temp_dir();
    let (empty, _) = write_test_files(dir.path());

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", format!("/v1.0/sha1/{}", EMPTY_SHA1).as_str())
        .with_status(200)
        .with_body(r#"{"id": 6011, "name": "empty"}"#)
        .create_async()
        .await;

    let (registry, _clock) = create_test_registry(&server.url());
    let file = registry.find_file_resource(&empty).await.unwrap().unwrap();

    assert_eq!(file.id(), ResourceId::Resolved(6011));
}

#[tokio::test]
async fn sqlite_cache_answers_after_reopen() {
    let dir = temp_dir();
    let (empty, _) = write_test_files(dir.path());
    let clock = std::sync::Arc::new(ManualClock::new(START_MS));

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/v1.0/sha1/{}", EMPTY_SHA1).as_str())
        .with_status(200)
        .with_body(r#"[{"id": 6011, "name": "empty"}]"#)
        .expect(1)
        .create_async()
        .await;

    let registry = create_sqlite_registry(dir.path(), &server.url(), clock.clone());
    registry.find_file_resource(&empty).await.unwrap();
    registry.close().unwrap();

    let reopened = create_sqlite_registry(dir.path(), &server.url(), clock);
    let file = reopened.find_file_resource(&empty).await.unwrap().unwrap();
    reopened.close().unwrap();

    mock.assert_async().await;
    assert_eq!(file.name(), Some("empty"));
}

#[tokio::test]
async fn missing_local_file_is_an_io_error() {
    let dir = temp_dir();
    let (registry, _clock) = create_test_registry("http://127.0.0.1:1");

    let result = registry
        .find_file_resources(&[dir.path().join("does-not-exist")])
        .await;

    assert!(matches!(result, Err(ossindex_client::error::ClientError::Io(_))));
}
