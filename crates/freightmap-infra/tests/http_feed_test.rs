//! HttpMarkerFeed and IpLocationProvider against a loopback HTTP server

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use freightmap_domain::repository::{LocationProvider, MarkerSource};
use freightmap_infra::{HttpMarkerFeed, IpLocationProvider};
use freightmap_types::{FeedError, GeoPoint, MarkerKind, PositionReport};

/// Serve a single canned response; the handle yields the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/map-data", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}

#[tokio::test]
async fn test_fetch_markers() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"markers":[{"id":"c1","type":"cargo","lat":55.75,"lng":37.61,"details":"Москва - Казань"},{"id":"broken"}]}"#,
    )
    .await;

    let feed = HttpMarkerFeed::new(url, Duration::from_secs(5)).unwrap();
    let markers = feed.fetch_markers().await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, "c1");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /map-data "));
}

#[tokio::test]
async fn test_non_success_status() {
    let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let feed = HttpMarkerFeed::new(url, Duration::from_secs(5)).unwrap();
    assert_eq!(feed.fetch_markers().await, Err(FeedError::Status(500)));
}

#[tokio::test]
async fn test_malformed_body() {
    let (url, _server) = serve_once("200 OK", "<html>maintenance</html>").await;
    let feed = HttpMarkerFeed::new(url, Duration::from_secs(5)).unwrap();
    assert!(matches!(feed.fetch_markers().await, Err(FeedError::Malformed(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/map-data", listener.local_addr().unwrap());
    drop(listener);

    let feed = HttpMarkerFeed::new(url, Duration::from_secs(5)).unwrap();
    assert!(matches!(feed.fetch_markers().await, Err(FeedError::Network(_))));
}

#[tokio::test]
async fn test_report_position() {
    let (url, server) = serve_once("200 OK", r#"{"success":true}"#).await;
    let feed = HttpMarkerFeed::new(url, Duration::from_secs(5)).unwrap();
    let report = PositionReport {
        kind: MarkerKind::Driver,
        id: "d1".to_string(),
        lat: 55.5,
        lng: 37.5,
    };
    feed.report_position(&report).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /map-data "));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let sent: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(sent, serde_json::json!({"type": "driver", "id": "d1", "lat": 55.5, "lng": 37.5}));
}

#[tokio::test]
async fn test_ip_location() {
    let (url, _server) = serve_once("200 OK", r#"{"ip":"203.0.113.7","latitude":55.75,"longitude":37.62}"#).await;
    let provider = IpLocationProvider::new(url, Duration::from_secs(5)).unwrap();
    assert_eq!(provider.locate().await.unwrap(), GeoPoint::new(55.75, 37.62));
}
