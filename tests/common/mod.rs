//! Common test utilities and helpers

#![allow(dead_code)]

use axum::Router;
use mcadmin_panel::{StreamEvent, StreamHandle};
use std::net::SocketAddr;
use std::time::Duration;

/// Serve `router` on a loopback port and return its base URL
pub async fn start_test_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Test server error: {}", e);
        }
    });

    format!("http://{}", addr)
}

/// A loopback URL nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Collect events until `count` disconnects were seen or the stream ends
pub async fn collect_until_disconnects(stream: &mut StreamHandle, count: usize) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    let mut disconnects = 0;

    while disconnects < count {
        match tokio::time::timeout(Duration::from_secs(10), stream.recv()).await {
            Ok(Some(event)) => {
                if matches!(event, StreamEvent::Disconnected(_)) {
                    disconnects += 1;
                }
                events.push(event);
            }
            Ok(None) => break,
            Err(_) => panic!("Timed out waiting for stream events: {:?}", events),
        }
    }

    events
}

/// Payloads of the message events
pub fn messages(events: &[StreamEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Message(data) => Some(data.as_str()),
            _ => None,
        })
        .collect()
}
