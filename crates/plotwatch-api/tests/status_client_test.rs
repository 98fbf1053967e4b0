// Integration tests for `StatusClient` using wiremock.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plotwatch_api::{ApiError, HostReport, PlotJob, PlotState, StatusClient};

async fn setup() -> (MockServer, StatusClient, String) {
    let server = MockServer::start().await;
    let client = StatusClient::new().unwrap();
    let host = server.address().to_string();
    (server, client, host)
}

#[tokio::test]
async fn fetch_decodes_cbor_report() {
    let (server, client, host) = setup().await;

    let report = HostReport {
        status: String::new(),
        active: vec![PlotJob {
            id: "0123456789abcdef0123456789abcdef".into(),
            state: PlotState::Running,
            phase: 2,
            progress: 40,
            phase_times: [Some(chrono::Utc::now()), None, None, None, None],
            source_dir: "/mnt/scratch0".into(),
            dest_dir: "/mnt/farm0".into(),
            log_tail: vec!["phase 2/4\n".into()],
        }],
        archived: Vec::new(),
        source_dirs: [("/mnt/scratch0".to_string(), 512_000_000_000)].into(),
        dest_dirs: [("/mnt/farm0".to_string(), 8_000_000_000_000)].into(),
    };
    let body = serde_cbor::to_vec(&report).unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let fetched = client.fetch(&host).await.unwrap();

    assert_eq!(fetched.active.len(), 1);
    assert_eq!(fetched.active[0].id, report.active[0].id);
    assert_eq!(fetched.active[0].phase, 2);
    assert_eq!(fetched.source_dirs["/mnt/scratch0"], 512_000_000_000);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (server, client, host) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0x00, 0x13, 0x37]))
        .mount(&server)
        .await;

    let err = client.fetch(&host).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got: {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let client = StatusClient::with_timeout(Duration::from_millis(500)).unwrap();

    // Reserved port with nothing listening.
    let err = client.fetch("127.0.0.1:9").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got: {err:?}");
}

#[tokio::test]
async fn error_status_is_a_network_error() {
    let (server, client, host) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.fetch(&host).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got: {err:?}");
}
