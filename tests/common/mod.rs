// Shared helpers: the fake dashboard server and browser availability checks
#![allow(dead_code)]

use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use pulseprobe::webdriver_manager::{ENV_WEBDRIVER_URL, WebDriverManager};
use pulseprobe::{Browser, BrowserType, SuiteConfig};

include!("../test_server_app.rs");

/// Overrides the browser used by browser tests (chrome or firefox)
pub const ENV_TEST_BROWSER: &str = "PULSEPROBE_TEST_BROWSER";

static TEST_SERVER: OnceCell<TestServerHandle> = OnceCell::new();

pub struct TestServerHandle {
    pub addr: SocketAddr,
    pub base_url: String,
}

/// Start the fake dashboard once per test binary
pub fn ensure_test_server() -> &'static TestServerHandle {
    TEST_SERVER.get_or_init(|| {
        let std_listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
        let addr = std_listener.local_addr().expect("Listener has no address");
        let base_url = format!("http://{}", addr);
        std_listener
            .set_nonblocking(true)
            .expect("Failed to make listener non-blocking");

        // Own thread and runtime, so the server outlives any single #[tokio::test]
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");
            runtime.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener)
                    .expect("Failed to adopt listener");
                axum::serve(listener, create_app().await)
                    .await
                    .expect("Test server failed");
            });
        });

        for attempt in 1..=30 {
            match ureq::get(&base_url).timeout(Duration::from_secs(1)).call() {
                Ok(_) => {
                    eprintln!("Test server ready at {} after {} attempts", base_url, attempt);
                    return TestServerHandle { addr, base_url };
                }
                Err(_) => std::thread::sleep(Duration::from_millis(100)),
            }
        }
        panic!("Test server at {} never answered", base_url);
    })
}

pub fn test_browser() -> BrowserType {
    std::env::var(ENV_TEST_BROWSER)
        .ok()
        .and_then(|b| b.parse().ok())
        .unwrap_or(BrowserType::Chrome)
}

/// Whether a WebDriver for `browser` can be reached or spawned
pub fn driver_available(browser: BrowserType) -> bool {
    std::env::var(ENV_WEBDRIVER_URL).is_ok_and(|url| !url.trim().is_empty())
        || WebDriverManager::find_executable(browser.driver_name()).is_some()
}

/// Suite configuration aimed at the fake dashboard, snapshots under `snapshot_dir`
pub fn fake_dashboard_config(snapshot_dir: &Path) -> SuiteConfig {
    let server = ensure_test_server();
    let mut config = SuiteConfig::default();
    config.base_url = server.base_url.clone();
    config.browser = test_browser();
    config.headless = true;
    config.timeouts.theme_settle_ms = 200;
    config.visual.baseline_dir = snapshot_dir.to_path_buf();
    config.visual.diff_dir = snapshot_dir.join("diffs");
    config
}

/// Start a browser session, or `None` (with a note on stderr) when no driver is usable
pub async fn start_browser(config: &SuiteConfig) -> Option<Browser> {
    if !driver_available(config.browser) {
        eprintln!(
            "Skipping: no {} found and {} not set",
            config.browser.driver_name(),
            ENV_WEBDRIVER_URL
        );
        return None;
    }
    match Browser::new(config.browser, config.viewport, config.headless).await {
        Ok(browser) => Some(browser),
        Err(e) => {
            eprintln!("Skipping: browser failed to start: {:#}", e);
            None
        }
    }
}
