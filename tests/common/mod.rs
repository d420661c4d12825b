//! Shared utilities for integration and load testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use companion_gateway::config::GatewayConfig;
use companion_gateway::http::HttpServer;
use companion_gateway::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

pub const COOKIE_NAME: &str = "app_jwt";

/// One request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, exactly as sent.
    pub target: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// What the mock backend answers.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
    pub location: Option<String>,
    /// Wait this long before answering.
    pub delay: Option<Duration>,
}

#[allow(dead_code)]
impl MockReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.into(),
            location: None,
            delay: None,
        }
    }

    pub fn text(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body: body.into(),
            location: None,
            delay: None,
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 307,
            content_type: None,
            body: String::new(),
            location: Some(location.into()),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Handle to a running mock backend; records every request it receives.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend received no request")
    }
}

/// Start a programmable mock backend on an ephemeral port.
#[allow(dead_code)]
pub async fn start_programmable_backend<F>(f: F) -> MockBackend
where
    F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref(), &recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// A backend that always answers with `reply`.
#[allow(dead_code)]
pub async fn start_mock_backend(reply: MockReply) -> MockBackend {
    start_programmable_backend(move |_| reply.clone()).await
}

async fn serve_one<F>(
    mut socket: TcpStream,
    f: &F,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()>
where
    F: Fn(&RecordedRequest) -> MockReply,
{
    let request = read_request(&mut socket).await?;
    let reply = f(&request);
    recorded.lock().unwrap().push(request);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut head = format!(
        "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    if let Some(ct) = reply.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    if let Some(location) = &reply.location {
        head.push_str(&format!("Location: {}\r\n", location));
    }
    head.push_str("\r\n");

    socket.write_all(head.as_bytes()).await?;
    socket.write_all(reply.body.as_bytes()).await?;
    socket.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_string();
    let target = request_line.next().unwrap_or("").to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

/// Gateway config pointed at `backend_url`, safe for tests.
pub fn gateway_config(backend_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = Some(backend_url.to_string());
    config.upstream.use_system_proxy = false;
    config.upstream.request_timeout_secs = 5;
    config.upstream.connect_timeout_secs = 2;
    config
}

/// A running gateway; stops when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn session_cookie(token: &str) -> String {
        format!("{}={}", COOKIE_NAME, token)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    /// GET with the session cookie set to `token`.
    pub fn get_as(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).header("cookie", Self::session_cookie(token))
    }

    /// POST with the session cookie set to `token`.
    pub fn post_as(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).header("cookie", Self::session_cookie(token))
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[allow(dead_code)]
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let (_, config_updates) = mpsc::unbounded_channel();
    start_gateway_with_updates(config, config_updates).await
}

#[allow(dead_code)]
/// A running gateway that swaps in every config received on `config_updates`.
pub async fn start_gateway_with_updates(
    config: GatewayConfig,
    config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
) -> TestGateway {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap();

    TestGateway {
        addr,
        client,
        shutdown,
    }
}

/// The `Set-Cookie` header for the session cookie, if any.
#[allow(dead_code)]
pub fn session_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", COOKIE_NAME)))
        .map(str::to_owned)
}
