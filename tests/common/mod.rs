//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fetch_control::{FetchError, FetchRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

#[allow(dead_code)]
pub fn request(path: &str) -> FetchRequest {
    FetchRequest::get(Url::parse(&format!("http://localhost{}", path)).unwrap())
}

/// Transport that blocks until the request's signal fires, then fails with
/// the abort reason. Counts invocations.
#[allow(dead_code)]
pub fn hanging_transport(
    calls: Arc<AtomicU32>,
) -> impl Fn(FetchRequest) -> std::pin::Pin<Box<dyn Future<Output = Result<(), FetchError>> + Send>>
       + Send
       + Sync
       + 'static {
    move |req: FetchRequest| {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match req.signal {
                Some(signal) => Err(FetchError::aborted(signal.cancelled().await)),
                None => std::future::pending().await,
            }
        })
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` yields the status code, body and delay before responding.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String, Duration)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body, delay) = f().await;
                        tokio::time::sleep(delay).await;

                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
