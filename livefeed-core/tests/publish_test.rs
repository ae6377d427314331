use livefeed_core::models::Configuration;
use livefeed_core::{PublishError, Publisher};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn test_config(addr: SocketAddr) -> Configuration {
    Configuration {
        publish_base_url: format!("http://{}", addr),
        ..Configuration::default()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Read one request including its body (needs Content-Length to know when
/// the body is complete).
async fn read_full_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

async fn respond(stream: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
}

#[tokio::test]
async fn publish_posts_payload_with_headers() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind publish server");
    let addr = listener.local_addr().unwrap();

    let captured = Arc::new(Mutex::new(String::new()));
    let captured_srv = Arc::clone(&captured);
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("failed to accept");
        *captured_srv.lock().unwrap() = read_full_request(&mut stream).await;
        respond(&mut stream, "200 OK", "Message published").await;
    });

    let publisher = Publisher::new(Arc::new(test_config(addr)));
    let ack = publisher.publish("hi there").await.expect("publish failed");
    assert_eq!(ack, "Message published");

    let request = captured.lock().unwrap().clone();
    let head = request.to_lowercase();
    assert!(head.starts_with("post /publish"));
    assert!(head.contains("authorization: bearer 1234"));
    assert!(head.contains("x-channel-name: test-common"));
    assert!(head.contains("content-type: application/json"));

    let body = request.split("\r\n\r\n").nth(1).expect("request had no body");
    let payload: serde_json::Value = serde_json::from_str(body).expect("body was not JSON");
    assert_eq!(payload["message"], "hi there");
    assert!(payload["timeStamp"].is_string());
}

#[tokio::test]
async fn publish_rejection_captures_response_body() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind publish server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("failed to accept");
        let _ = read_full_request(&mut stream).await;
        respond(&mut stream, "500 Internal Server Error", "kaboom").await;
    });

    let publisher = Publisher::new(Arc::new(test_config(addr)));
    let err = publisher
        .publish("hi")
        .await
        .expect_err("expected a rejection");
    match err {
        PublishError::Rejected { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "kaboom");
        }
        other => panic!("expected Rejected, got {}", other),
    }
}

#[tokio::test]
async fn publish_network_failure_has_no_response() {
    // Bind then drop, so the port is known to refuse connections.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let publisher = Publisher::new(Arc::new(test_config(addr)));
    let err = publisher
        .publish("hi")
        .await
        .expect_err("expected a network failure");
    assert!(matches!(err, PublishError::Network(_)), "got {}", err);
}
