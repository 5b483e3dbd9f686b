use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::errors::PulseprobeError;
use crate::webdriver::BrowserType;

/// Environment variable pointing at an already running WebDriver
pub const ENV_WEBDRIVER_URL: &str = "PULSEPROBE_WEBDRIVER_URL";

const STARTUP_ATTEMPTS: u32 = 50;
const STARTUP_POLL: Duration = Duration::from_millis(100);

/// Finds a usable WebDriver endpoint per browser, spawning one when needed
#[derive(Default)]
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl DriverProcess {
    fn terminate(&mut self) {
        debug!(
            "Stopping {} on port {}",
            self.browser_type.driver_name(),
            self.port
        );

        // Spawned in its own process group, so the browsers it started go too
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            let pgid = Pid::from_raw(self.child.id() as i32);
            if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                debug!("SIGTERM to process group {} failed: {}", pgid, e);
            }
            std::thread::sleep(Duration::from_millis(100));
            let _ = killpg(pgid, Signal::SIGKILL);
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> MutexGuard<'_, Vec<DriverProcess>> {
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// URL of a ready WebDriver for `browser_type`.
    ///
    /// Checked in order: the `PULSEPROBE_WEBDRIVER_URL` override, drivers this
    /// manager started, the driver's conventional port, and finally a newly
    /// spawned driver on a free port.
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String> {
        if let Ok(url) = std::env::var(ENV_WEBDRIVER_URL)
            && !url.trim().is_empty()
        {
            let url = url.trim_end_matches('/').to_string();
            if Self::is_driver_ready(&url).await {
                debug!("Using WebDriver from {} at {}", ENV_WEBDRIVER_URL, url);
                return Ok(url);
            }
            return Err(PulseprobeError::WebDriverFailed(format!(
                "{} is set but no ready WebDriver answers at {}",
                ENV_WEBDRIVER_URL, url
            ))
            .into());
        }

        let managed: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == *browser_type)
            .map(|p| p.url.clone())
            .collect();
        for url in managed {
            if Self::is_driver_ready(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        let standard = format!("http://localhost:{}", browser_type.default_port());
        if Self::is_driver_ready(&standard).await {
            debug!("Found external WebDriver at {}", standard);
            return Ok(standard);
        }

        info!("No {} running, starting one", browser_type.driver_name());
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String> {
        let command = browser_type.driver_name();
        let executable = Self::find_executable(command).ok_or_else(|| {
            PulseprobeError::WebDriverFailed(format!(
                "{} not found in PATH. Install it or set {} to a running driver",
                command, ENV_WEBDRIVER_URL
            ))
        })?;

        let port = Self::free_port()?;
        let port_arg = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };

        let mut cmd = Command::new(&executable);
        cmd.args(&port_arg)
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", executable.display()))?;
        info!("Started {} (pid {}) on port {}", command, child.id(), port);

        let url = format!("http://localhost:{}", port);
        self.processes().push(DriverProcess {
            browser_type: *browser_type,
            child,
            port,
            url: url.clone(),
        });

        for _ in 0..STARTUP_ATTEMPTS {
            if Self::is_driver_ready(&url).await {
                return Ok(url);
            }
            sleep(STARTUP_POLL).await;
        }

        self.stop_port(port);
        Err(PulseprobeError::WebDriverFailed(format!(
            "{} did not become ready on port {}",
            command, port
        ))
        .into())
    }

    /// Locate `command` on the PATH
    pub fn find_executable(command: &str) -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .flat_map(|dir| {
                let plain = dir.join(command);
                let exe = dir.join(format!("{}.exe", command));
                [plain, exe]
            })
            .find(|candidate| candidate.is_file())
    }

    /// Port the OS considers free right now
    pub fn free_port() -> Result<u16> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .context("Failed to find a free port for the WebDriver")?;
        Ok(listener.local_addr()?.port())
    }

    /// Whether the driver at `url` answers `/status` with `ready: true`
    pub async fn is_driver_ready(url: &str) -> bool {
        let status_url = format!("{}/status", url);
        let response = match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };

        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .pointer("/value/ready")
                .and_then(|r| r.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Stop every driver this manager started for `browser_type`
    pub fn kill_driver(&self, browser_type: &BrowserType) {
        let mut processes = self.processes();
        processes.retain_mut(|p| {
            if p.browser_type == *browser_type {
                p.terminate();
                false
            } else {
                true
            }
        });
    }

    fn stop_port(&self, port: u16) {
        let mut processes = self.processes();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            processes.remove(index).terminate();
        }
    }

    /// Number of drivers currently managed
    pub fn managed_count(&self) -> usize {
        self.processes().len()
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let mut processes = self.processes();
        for process in processes.iter_mut() {
            process.terminate();
        }
        processes.clear();
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
