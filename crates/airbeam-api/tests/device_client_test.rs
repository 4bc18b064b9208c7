#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceClient` using wiremock.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use airbeam_api::{DeviceClient, DownloadOutcome, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DeviceClient::with_client(reqwest::Client::new(), "Lobby_Cam", base_url)
        .with_record_settle(Duration::ZERO);
    (server, client)
}

fn info_xml(available: &str, duration: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\
         <airbeam>\
           <name>Lobby Cam</name>\
           <camera><available>YES</available></camera>\
           <recording>\
             <status>RECORDING</status>\
             <available>{available}</available>\
             <duration>{duration}</duration>\
           </recording>\
         </airbeam>"
    )
}

async fn mount_ok(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

/// A bare HTTP server that promises a 100 000 byte body, sends a few bytes,
/// then closes the connection.
async fn truncating_server() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100000\r\nconnection: close\r\n\r\npartial")
                .await;
            let _ = socket.shutdown().await;
        }
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

// ── Status tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(info_xml("NO", "00:00:00")))
        .mount(&server)
        .await;

    let status = client.status().await.unwrap();

    assert_eq!(status.device_name, "Lobby Cam");
    assert_eq!(status.camera_available, "YES");
    assert_eq!(status.recording_status, "RECORDING");
    assert!(!status.is_recording_available());
}

#[tokio::test]
async fn test_status_non_200_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.status().await;

    assert!(
        matches!(result, Err(Error::Status { status: 503, .. })),
        "expected Status error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_status_missing_node() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<airbeam><name>x</name></airbeam>"))
        .mount(&server)
        .await;

    let result = client.status().await;

    assert!(matches!(result, Err(Error::MissingField { field: "camera/available" })));
}

#[tokio::test]
async fn test_recording_duration_secs() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(info_xml("YES", "01:00:01")))
        .mount(&server)
        .await;

    assert_eq!(client.recording_duration_secs().await.unwrap(), 3601);
}

#[tokio::test]
async fn test_recording_duration_unparseable_is_zero() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(info_xml("YES", "--:--")))
        .mount(&server)
        .await;

    assert_eq!(client.recording_duration_secs().await.unwrap(), 0);
}

// ── Control tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_control_endpoints() {
    let (server, client) = setup().await;

    for route in ["/record", "/stoprecord", "/startcamera", "/stopcamera"] {
        mount_ok(&server, route).await;
    }

    client.start_camera().await.unwrap();
    client.start_recording().await.unwrap();
    client.stop_recording().await.unwrap();
    client.stop_camera().await.unwrap();

    let seen: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .collect();
    assert_eq!(seen, ["/startcamera", "/record", "/stoprecord", "/stopcamera"]);
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let client = DeviceClient::with_client(reqwest::Client::new(), "gone", base_url);

    let err = client.status().await.unwrap_err();

    assert!(err.is_connection(), "expected connection error, got: {err:?}");
}

// ── Recording tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_recordings() {
    let (server, client) = setup().await;

    let html = r#"<html><body><ul>
        <li><a href="/recording/20240101_0900.mov">20240101_0900.mov</a></li>
        <li><a href="/recording/20240101_1000.mov">20240101_1000.mov</a></li>
        <li><a href="/settings.html">Settings</a></li>
    </ul></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/recordings.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let files = client.list_recordings().await.unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.contains("20240101_0900.mov"));
    assert!(files.contains("20240101_1000.mov"));
}

#[tokio::test]
async fn test_download_recording_writes_named_file() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let body = vec![7u8; 10_000];

    Mock::given(method("GET"))
        .and(path("/recording/a.mov"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let outcome = client.download_recording("a.mov", dir.path()).await.unwrap();

    let local = match outcome {
        DownloadOutcome::Complete(local) => local,
        other => panic!("expected a completed download, got {other:?}"),
    };
    assert_eq!(local.parent(), Some(dir.path()));
    assert_eq!(std::fs::read(&local).unwrap(), body);

    let name = local.file_name().unwrap().to_str().unwrap();
    let rest = name.strip_prefix("Lobby_Cam_").unwrap();
    let (stamp, original) = rest.split_once('_').unwrap();
    assert_eq!(stamp.len(), 10);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(original, "a.mov");
}

#[tokio::test]
async fn test_download_recording_rejected_writes_nothing() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/recording/b.mov"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = client.download_recording("b.mov", dir.path()).await.unwrap();

    assert_eq!(outcome, DownloadOutcome::Rejected(404));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_recording_cut_short_is_an_error() {
    let base_url = truncating_server().await;
    let client = DeviceClient::with_client(reqwest::Client::new(), "Lobby_Cam", base_url);
    let dir = tempfile::tempdir().unwrap();

    let result = client.download_recording("a.mov", dir.path()).await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected a transport error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_delete_recording() {
    let (server, client) = setup().await;

    mount_ok(&server, "/delete/a.mov").await;

    client.delete_recording("a.mov").await.unwrap();
}
