#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use kiwify::app::App;
use kiwify::config::Config;
use kiwify::mcp::server::McpServer;
use kiwify::services::clock::Clock;
use kiwify::services::gateway::ApiGateway;
use kiwify::services::logger::Logger;
use kiwify::services::token_manager::TokenManager;
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "secret-456";
pub const ACCOUNT_ID: &str = "acct-789";
pub const PRODUCT_ID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

pub fn config(base_url: &str) -> Config {
    Config::new(CLIENT_ID, CLIENT_SECRET, ACCOUNT_ID)
        .with_base_url(base_url)
        .expect("fake server url")
}

pub fn logger() -> Logger {
    Logger::new("test")
}

pub fn token_manager(base_url: &str, clock: Arc<ManualClock>) -> TokenManager {
    TokenManager::with_clock(
        logger(),
        reqwest::Client::new(),
        &config(base_url),
        clock,
    )
}

pub fn gateway(base_url: &str) -> Arc<ApiGateway> {
    let tokens = Arc::new(token_manager(base_url, ManualClock::fixed()));
    Arc::new(ApiGateway::new(
        logger(),
        reqwest::Client::new(),
        &config(base_url),
        tokens,
    ))
}

pub fn server(base_url: &str) -> McpServer {
    let app = App::with_gateway(logger(), gateway(base_url)).expect("app wiring");
    McpServer::new(app)
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn fixed() -> Arc<Self> {
        Self::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now = *now + Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }

    pub fn is_oauth(&self) -> bool {
        self.path().ends_with("/oauth/token")
    }
}

#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl FakeResponse {
    pub fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }

    fn render(&self) -> Vec<u8> {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let head = if self.status == 204 {
            format!("HTTP/1.1 204 {}\r\nConnection: close\r\n\r\n", reason)
        } else {
            format!(
                "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                self.status,
                reason,
                self.content_type,
                self.body.len()
            )
        };
        let mut out = head.into_bytes();
        if self.status != 204 {
            out.extend_from_slice(self.body.as_bytes());
        }
        out
    }
}

pub fn oauth_ok(token: &str, expires_in: i64) -> FakeResponse {
    FakeResponse::json(
        200,
        serde_json::json!({ "access_token": token, "expires_in": expires_in, "token_type": "Bearer" }),
    )
}

type Route = dyn Fn(&RecordedRequest) -> FakeResponse + Send + Sync;

/// In-process stand-in for the platform: records every request, answers from `route`.
pub struct FakeKiwify {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl FakeKiwify {
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&RecordedRequest) -> FakeResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);
        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let route = route.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    serve_connection(stream, route, recorded).await;
                });
            }
        });
        Self {
            base_url: format!("http://{}/v1", addr),
            requests,
            task,
        }
    }

    /// Token endpoint always succeeds with a one-hour token; resources use `route`.
    pub async fn with_token<F>(route: F) -> Self
    where
        F: Fn(&RecordedRequest) -> FakeResponse + Send + Sync + 'static,
    {
        Self::start(move |req| {
            if req.is_oauth() {
                oauth_ok("tok-1", 3600)
            } else {
                route(req)
            }
        })
        .await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn oauth_calls(&self) -> usize {
        self.requests().iter().filter(|r| r.is_oauth()).count()
    }

    pub fn resource_requests(&self) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| !r.is_oauth()).collect()
    }

    pub fn last_resource_request(&self) -> RecordedRequest {
        self.resource_requests()
            .pop()
            .expect("at least one resource request")
    }
}

impl Drop for FakeKiwify {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    route: Arc<Route>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    recorded.lock().unwrap().push(request.clone());
    let response = route(&request);
    let _ = stream.write_all(&response.render()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos;
        }
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
