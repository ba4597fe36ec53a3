//! Serves real TCP connections and shuts down cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use heron_core::Request;
use heron_extract::Json;
use heron_server::{Server, ShutdownSignal};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn echo_path(req: Request) -> Json<Value> {
    Json(json!({ "path": req.path() }))
}

async fn raw_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_requests_then_runs_hooks() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let hook_ran = Arc::new(AtomicBool::new(false));
    let mut server = Server::builder()
        .shutdown_timeout(Duration::from_millis(500))
        .request_timeout(Duration::from_secs(5))
        .build();
    server.route("GET", "/echo/**", echo_path).unwrap();
    let flag = Arc::clone(&hook_ran);
    server
        .on_shutdown("mark", move || async move {
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();

    let shutdown = ShutdownSignal::new();
    let running = tokio::spawn(server.run_with_listener(listener, shutdown.clone()));

    let response = raw_get(addr, "/echo/a/b").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("content-type: application/json"), "{response}");
    assert!(response.contains("set-cookie: heronSession="), "{response}");
    assert!(response.ends_with(r#"{"path":"/echo/a/b"}"#), "{response}");

    let response = raw_get(addr, "/missing").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "{response}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server should stop")
        .expect("server task should not panic")
        .expect("server should exit cleanly");
    assert!(hook_ran.load(Ordering::SeqCst));
}
