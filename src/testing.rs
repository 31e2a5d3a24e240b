//! One-shot HTTP server for exercising the real reqwest clients.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A server that answers exactly one request.
pub(crate) struct OneShotServer {
    /// Base URL, no trailing slash
    pub(crate) url: String,
    request: JoinHandle<String>,
}

impl OneShotServer {
    /// Serves `parts` back to back as the raw response, then closes.
    pub(crate) async fn start(parts: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let request = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            for part in parts {
                socket.write_all(&part).await.expect("write response");
                socket.flush().await.expect("flush response");
            }
            let _ = socket.shutdown().await;
            request
        });
        Self {
            url: format!("http://{addr}"),
            request,
        }
    }

    /// Accepts one request and never answers it.
    pub(crate) async fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let request = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            // hold the connection until the client gives up
            let mut rest = Vec::new();
            let _ = socket.read_to_end(&mut rest).await;
            request
        });
        Self {
            url: format!("http://{addr}"),
            request,
        }
    }

    /// The raw request the server saw.
    pub(crate) async fn request(self) -> String {
        self.request.await.expect("server task")
    }
}

/// A complete response with a `Content-Length` body.
pub(crate) fn response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut raw = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    raw.extend_from_slice(body);
    raw
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let read = socket.read(&mut buf).await.expect("read request");
        if read == 0 {
            return String::from_utf8_lossy(&raw).to_string();
        }
        raw.extend_from_slice(&buf[..read]);
        if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while raw.len() < header_end + content_length {
        let read = socket.read(&mut buf).await.expect("read request body");
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..read]);
    }
    String::from_utf8_lossy(&raw).to_string()
}
