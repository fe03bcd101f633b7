use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::service::{DecodeMode, PodinfoConfig, RedisConfig, ServiceConfig, ValidateRoute};
use crate::config::settings::{LoggingConfig, MetricsConfig};
use crate::error::{Error, Result};
use crate::store::{RemoteStore, StoreConnector};

pub const FAKE_TOKEN: &str = "abc123";
pub const FAKE_EXPIRES_AT: &str = "2025-01-01T00:00:00Z";
pub const FAKE_TOKEN_NAME: &str = "demo";
pub const RESULT_KEY: &str = "validation_result";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn service_config(base_url: String) -> ServiceConfig {
    ServiceConfig {
        log: LoggingConfig::default(),
        podinfo: PodinfoConfig {
            base_url,
            token_endpoint: "/token".to_string(),
            token_validate: "/token/validate".to_string(),
            cache_endpoint: format!("/cache/{}", RESULT_KEY),
            validate_route: ValidateRoute::Fixed,
            decode: DecodeMode::Lenient,
            timeout_ms: Some(5000),
        },
        redis: RedisConfig {
            validation_result_key: RESULT_KEY.to_string(),
            ..RedisConfig::default()
        },
        metrics: MetricsConfig::default(),
    }
}

// -------------------------------
// Redis wire protocol double
// -------------------------------

/// Minimal RESP2 server answering the commands `RedisStore` issues.
/// Every received command is recorded as its space-joined arguments.
pub struct FakeRedis {
    pub port: u16,
    pub entries: Arc<Mutex<HashMap<String, String>>>,
    pub commands: Arc<Mutex<Vec<String>>>,
    pub handle: JoinHandle<()>,
}

impl FakeRedis {
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn position(&self, command: &str) -> Option<usize> {
        self.commands().iter().position(|c| c == command)
    }
}

pub async fn spawn_fake_redis(seed: &[(&str, &str)]) -> FakeRedis {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let port = listener.local_addr().unwrap().port();
    let entries: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(
        seed.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    ));
    let commands: Arc<Mutex<Vec<String>>> = Arc::default();

    let (task_entries, task_commands) = (entries.clone(), commands.clone());
    let handle = tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let entries = task_entries.clone();
            let commands = task_commands.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                while let Ok(Some(args)) = read_command(&mut reader).await {
                    commands.lock().unwrap().push(args.join(" "));
                    let response = redis_reply(&args, &entries);
                    if write.write_all(response.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    FakeRedis {
        port,
        entries,
        commands,
        handle,
    }
}

/// Reads one `*N` array of bulk strings; `None` on end of stream.
async fn read_command<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Vec<String>>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let count: usize = line.trim_end().trim_start_matches('*').parse().unwrap_or(0);

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await?;
        let len: usize = line.trim_end().trim_start_matches('$').parse().unwrap_or(0);
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(Some(args))
}

fn redis_reply(args: &[String], entries: &Mutex<HashMap<String, String>>) -> String {
    let name = args.first().map(|a| a.to_uppercase()).unwrap_or_default();
    let keys = args.get(1..).unwrap_or_default();
    let mut entries = entries.lock().unwrap();
    match name.as_str() {
        "PING" => "+PONG\r\n".to_string(),
        "AUTH" | "CLIENT" | "SELECT" => "+OK\r\n".to_string(),
        "EXISTS" => format!(":{}\r\n", keys.iter().filter(|k| entries.contains_key(*k)).count()),
        "GET" => match keys.first().and_then(|k| entries.get(k)) {
            Some(value) => format!("${}\r\n{}\r\n", value.len(), value),
            None => "$-1\r\n".to_string(),
        },
        "DEL" => format!(":{}\r\n", keys.iter().filter(|k| entries.remove(*k).is_some()).count()),
        _ => format!("-ERR unknown command '{}'\r\n", name),
    }
}

// -------------------------------
// Remote store double
// -------------------------------

/// In-memory store shared by every connection handed out by `MemoryConnector`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl MemoryStore {
    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(key.to_owned(), value.to_owned());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl RemoteStore for MemoryStore {
    async fn key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.contains(key))
    }

    async fn get_value(&self, key: &str) -> Result<String> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    async fn delete_key(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub store: MemoryStore,
    pub connects: Arc<AtomicUsize>,
    pub unreachable: bool,
}

impl MemoryConnector {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl StoreConnector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, cfg: &RedisConfig) -> Result<MemoryStore> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(Error::Connection {
                addr: cfg.addr(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.store.clone())
    }
}

// -------------------------------
// Token service double
// -------------------------------

/// Podinfo-like token service. The cache endpoint writes the posted body into
/// `store` under the key taken from the path, the way podinfo does with redis.
#[derive(Clone)]
pub struct FakePodinfo {
    /// Token handed out by `/token`; only `FAKE_TOKEN` passes validation.
    pub issued_token: &'static str,
    pub token_status: StatusCode,
    pub cache_status: StatusCode,
    pub write_on_cache: bool,
    pub store: MemoryStore,
    pub token_calls: Arc<AtomicUsize>,
    pub validate_calls: Arc<AtomicUsize>,
    pub cache_calls: Arc<AtomicUsize>,
}

impl FakePodinfo {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            issued_token: FAKE_TOKEN,
            token_status: StatusCode::OK,
            cache_status: StatusCode::ACCEPTED,
            write_on_cache: true,
            store,
            token_calls: Arc::default(),
            validate_calls: Arc::default(),
            cache_calls: Arc::default(),
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/token", post(issue_token))
            .route("/token/validate", get(validate_token))
            .route("/cache/{key}", post(cache_value))
            .with_state(self)
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.token_calls.load(Ordering::SeqCst),
            self.validate_calls.load(Ordering::SeqCst),
            self.cache_calls.load(Ordering::SeqCst),
        )
    }
}

async fn issue_token(State(fake): State<FakePodinfo>) -> Response {
    fake.token_calls.fetch_add(1, Ordering::SeqCst);
    if fake.token_status != StatusCode::OK {
        return (fake.token_status, "token issuing failed").into_response();
    }
    Json(json!({"token": fake.issued_token})).into_response()
}

async fn validate_token(State(fake): State<FakePodinfo>, headers: HeaderMap) -> Response {
    fake.validate_calls.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", FAKE_TOKEN);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(json!({
            "expires_at": FAKE_EXPIRES_AT,
            "token_name": FAKE_TOKEN_NAME
        }))
        .into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"code": 401, "message": "invalid token"}))).into_response(),
    }
}

async fn cache_value(
    State(fake): State<FakePodinfo>,
    axum::extract::Path(key): axum::extract::Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    fake.cache_calls.fetch_add(1, Ordering::SeqCst);
    if fake.write_on_cache && fake.cache_status.is_success() {
        fake.store.insert(&key, &body.to_string());
    }
    fake.cache_status
}
