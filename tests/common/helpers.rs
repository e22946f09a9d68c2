use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use courier::http::{
    Transport, TransportError, TransportErrorKind, TransportRequest, TransportResponse,
};
use courier::http::HttpClientConfig;
use courier::retry::{Backoff, Sleeper};
use courier::{Engine, EngineBuilder};
use reqwest::header::HeaderMap;
use reqwest::{Method, Proxy, StatusCode, Url};
use tracing_subscriber::EnvFilter;

// Common test constants
pub const TEST_BASE_URL: &str = "http://api.example.com";
pub const TEST_USER_AGENT: &str = "courier-test-agent";

/// Installs a test subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a test URL under the common base.
pub fn create_test_url(path: &str) -> String {
    format!("{}/{}", TEST_BASE_URL, path.trim_start_matches('/'))
}

// === Mock Transport ===

/// One scripted transport outcome.
#[derive(Clone, Debug)]
pub enum Reply {
    Status(u16, String),
    Fail(TransportErrorKind),
}

impl Reply {
    pub fn status(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }
}

/// What the transport saw for a single attempt.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A transport answering from a script. The last entry repeats forever.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Reply>>,
    recorded: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            recorded: Mutex::new(Vec::new()),
        })
    }

    /// A transport that always answers with `code` and `body`.
    pub fn always(code: u16, body: &str) -> Arc<Self> {
        Self::new([Reply::status(code, body)])
    }

    pub fn calls(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.recorded
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was recorded")
    }

    fn next_reply(&self) -> Reply {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().expect("empty transport script")
        }
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let body = request.body.map(|mut stream| {
            let mut bytes = Vec::new();
            stream.read_to_end(&mut bytes).unwrap();
            bytes
        });

        self.recorded.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url.to_string(),
            headers: request.headers,
            body,
        });

        match self.next_reply() {
            Reply::Status(code, body) => Ok(TransportResponse::from_bytes(
                StatusCode::from_u16(code).unwrap(),
                HeaderMap::new(),
                body,
            )),
            Reply::Fail(kind) => Err(TransportError::new(kind, format!("scripted {}", kind))),
        }
    }
}

// === Sleeper ===

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

// === Engine Helpers ===

/// Creates an engine over `transport` that records instead of sleeping.
pub fn create_test_engine(
    transport: Arc<MockTransport>,
    sleeper: Arc<RecordingSleeper>,
) -> Engine {
    create_test_engine_builder(transport, sleeper)
        .build()
        .expect("Failed to build test engine")
}

/// Creates a builder wired to the mock transport and recording sleeper.
pub fn create_test_engine_builder(
    transport: Arc<MockTransport>,
    sleeper: Arc<RecordingSleeper>,
) -> EngineBuilder {
    EngineBuilder::new().transport(transport).sleeper(sleeper)
}

/// A backoff schedule short enough for network tests.
pub fn fast_backoff() -> Backoff {
    Backoff::new(Duration::from_millis(1), Duration::ZERO)
}

/// Client settings for loopback tests: short timeouts and no proxy.
pub fn loopback_client_config() -> HttpClientConfig {
    HttpClientConfig {
        timeout: Some(Duration::from_secs(5)),
        connect_timeout: Some(Duration::from_secs(2)),
        proxy: Some(Proxy::custom(|_| None::<Url>)),
        ..HttpClientConfig::default()
    }
}

// === Loopback Server ===

/// A request captured by the [`TestServer`].
#[derive(Clone, Debug)]
pub struct ServedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ServedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A minimal HTTP/1.1 server on loopback answering from a script.
///
/// Every connection serves exactly one request and is then closed. The last
/// scripted reply repeats.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<ServedRequest>>>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub fn start(replies: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            let mut replies: VecDeque<(u16, &'static str)> = replies.into();
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let reply = if replies.len() > 1 {
                    replies.pop_front().unwrap()
                } else {
                    replies.front().copied().unwrap_or((200, ""))
                };
                serve(stream, reply, &seen);
            }
        });

        Self {
            addr,
            requests,
            _handle: handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<ServedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(
    stream: TcpStream,
    (code, body): (u16, &str),
    seen: &Mutex<Vec<ServedRequest>>,
) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut request_body = vec![0; length];
    reader.read_exact(&mut request_body).ok()?;

    seen.lock().unwrap().push(ServedRequest {
        method,
        target,
        headers,
        body: request_body,
    });

    let reason = StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        reason,
        body.len(),
        body
    )
    .ok()?;
    stream.flush().ok()
}

/// Binds a loopback listener that never accepts and fills its accept
/// backlog, so that further connection attempts hang until they time out.
///
/// The returned streams must stay alive for as long as the backlog should
/// stay full.
pub fn saturated_listener() -> (TcpListener, Vec<TcpStream>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    let mut streams = Vec::new();
    for _ in 0..4096 {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
            Ok(stream) => streams.push(stream),
            Err(_) => break,
        }
    }

    (listener, streams)
}

/// Returns a loopback address nothing listens on.
pub fn unused_local_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().unwrap()
}
