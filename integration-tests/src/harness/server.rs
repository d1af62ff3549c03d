use crate::harness::{CapturedEvent, init_test_tracing};
use greendots_core::conf::DashboardConfig;
use greendots_core::server::build_pingora_server;
use reqwest::blocking::{Client, RequestBuilder};
use std::net::TcpStream;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Handle to a running dashboard over a private projects root.
pub struct TestServer {
    base_url: String,
    client: Client,
    root: TempDir,
}

impl TestServer {
    /// Start with test-friendly timings: a 50ms poll interval and a 400ms poll timeout.
    pub fn start() -> Self {
        Self::start_with(|_| {})
    }

    /// Start after letting `tweak` adjust the configuration.
    ///
    /// Every server gets its own port and temp directory, so tests stay parallel-safe.
    pub fn start_with(tweak: impl FnOnce(&mut DashboardConfig)) -> Self {
        // Initialize tracing (this must happen first).
        init_test_tracing(events());

        let root = tempfile::tempdir().expect("failed to create projects root");
        let listen_port = free_port();

        let mut cfg = DashboardConfig {
            projects_dir: root.path().to_path_buf(),
            listen_address: format!("127.0.0.1:{listen_port}"),
            ..DashboardConfig::default()
        };
        cfg.status_poll.sleep_ms = 50;
        cfg.status_poll.timeout_ms = 400;
        cfg.status_stream.eof_sleep_ms = 50;
        tweak(&mut cfg);

        let server =
            build_pingora_server(Arc::new(cfg)).expect("failed to build dashboard server");

        thread::spawn(move || {
            server.run_forever();
        });

        let base_url = format!("http://127.0.0.1:{listen_port}");
        wait_for_server(&base_url);

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build client");

        Self {
            base_url,
            client,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn head(&self, path: &str) -> RequestBuilder {
        self.client.head(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Poll until the server accepts connections (or panic).
fn wait_for_server(listen_addr: &str) {
    let addr = listen_addr.strip_prefix("http://").unwrap_or(listen_addr);

    let deadline = Instant::now() + Duration::from_secs(2);

    loop {
        match TcpStream::connect(addr) {
            Ok(_) => return,
            Err(_) => {
                if Instant::now() > deadline {
                    panic!("server failed to start at {}", listen_addr);
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

static EVENTS: OnceLock<Arc<Mutex<Vec<CapturedEvent>>>> = OnceLock::new();

/// Events captured from every server in this test binary.
pub fn events() -> Arc<Mutex<Vec<CapturedEvent>>> {
    EVENTS
        .get_or_init(|| Arc::new(Mutex::new(Vec::new())))
        .clone()
}

/// Allocate a free port on localhost.
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
