//! WebDriver process management - spawning and health checking a local driver

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use transcheck_common::BrowserKind;

use crate::error::{HarnessError, HarnessResult};

/// Handle to a running chromedriver / geckodriver process
pub struct DriverProcess {
    child: Child,
    pub url: String,
    pub port: u16,
    stopped: bool,
}

/// Time a driver gets to exit after SIGTERM
const STOP_GRACE: Duration = Duration::from_millis(200);

impl DriverProcess {
    /// Spawn `binary` on a free port and wait until it answers `/status`
    pub async fn spawn(binary: &Path, browser: BrowserKind, startup_timeout: Duration) -> HarnessResult<Self> {
        let port = find_free_port()?;
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", binary.display(), port);

        let mut cmd = Command::new(binary);
        match browser {
            BrowserKind::Chromium => {
                cmd.arg(format!("--port={}", port));
            }
            BrowserKind::Firefox => {
                cmd.args(["--port", &port.to_string()]);
            }
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            HarnessError::DriverStartup(format!("Failed to spawn {}: {}", binary.display(), e))
        })?;

        let handle = DriverProcess { child, url, port, stopped: false };
        handle.wait_for_ready(startup_timeout).await?;

        info!("WebDriver is ready at {}", handle.url);
        Ok(handle)
    }

    /// Wait for the driver to report ready on its status endpoint
    async fn wait_for_ready(&self, timeout_duration: Duration) -> HarnessResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value = resp.json().await.unwrap_or_default();
                    if driver_ready(&body) {
                        return Ok(());
                    }
                }
                Ok(resp) => {
                    warn!("Driver status returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver to start...");
                    }
                    // Connection refused is expected while the driver boots
                    if !e.is_connect() {
                        warn!("Driver status error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(HarnessError::DriverHealthCheck(attempts))
    }

    /// Stop the driver: SIGTERM, a short grace period, then kill
    pub async fn shutdown(mut self) -> HarnessResult<()> {
        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                let deadline = tokio::time::Instant::now() + STOP_GRACE;
                while tokio::time::Instant::now() < deadline {
                    if self.child.try_wait()?.is_some() {
                        break;
                    }
                    sleep(Duration::from_millis(20)).await;
                }
            }
        }

        self.kill_now();
        Ok(())
    }

    fn kill_now(&mut self) {
        if self.stopped {
            return;
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.stopped = true;
    }
}

// Fallback when `shutdown` was never awaited (early error paths).
impl Drop for DriverProcess {
    fn drop(&mut self) {
        self.kill_now();
    }
}

/// Where to reach WebDriver: an existing endpoint or a driver we own
pub enum DriverEndpoint {
    External(String),
    Spawned(DriverProcess),
}

impl DriverEndpoint {
    pub fn url(&self) -> &str {
        match self {
            DriverEndpoint::External(url) => url,
            DriverEndpoint::Spawned(process) => &process.url,
        }
    }

    /// Stop a spawned driver; external endpoints are left alone
    pub async fn shutdown(self) -> HarnessResult<()> {
        match self {
            DriverEndpoint::External(_) => Ok(()),
            DriverEndpoint::Spawned(process) => process.shutdown().await,
        }
    }
}

/// W3C drivers answer `{"value": {"ready": true}}`; older ones omit the flag
fn driver_ready(body: &serde_json::Value) -> bool {
    body.get("value")
        .and_then(|v| v.get("ready"))
        .and_then(|r| r.as_bool())
        .unwrap_or(true)
}

fn find_free_port() -> HarnessResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Default driver binary name for a browser
pub fn default_driver_binary(browser: BrowserKind) -> PathBuf {
    match browser {
        BrowserKind::Chromium => PathBuf::from("chromedriver"),
        BrowserKind::Firefox => PathBuf::from("geckodriver"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 0);
    }

    #[test]
    fn test_driver_ready_flag() {
        assert!(driver_ready(&serde_json::json!({ "value": { "ready": true } })));
        assert!(!driver_ready(&serde_json::json!({ "value": { "ready": false } })));
        assert!(driver_ready(&serde_json::json!({ "status": 0 })));
    }

    #[cfg(unix)]
    fn sleeper() -> (DriverProcess, nix::unistd::Pid) {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = nix::unistd::Pid::from_raw(child.id() as i32);
        let process = DriverProcess {
            child,
            url: "http://127.0.0.1:0".into(),
            port: 0,
            stopped: false,
        };
        (process, pid)
    }

    #[cfg(unix)]
    fn is_running(pid: nix::unistd::Pid) -> bool {
        nix::sys::signal::kill(pid, None).is_ok()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shutdown_terminates_driver() {
        let (process, pid) = sleeper();
        assert!(is_running(pid));

        let start = std::time::Instant::now();
        DriverEndpoint::Spawned(process).shutdown().await.unwrap();

        assert!(!is_running(pid));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_drop_kills_driver() {
        let (process, pid) = sleeper();
        drop(process);
        assert!(!is_running(pid));
    }

    #[tokio::test]
    async fn test_external_endpoint_shutdown_is_noop() {
        let endpoint = DriverEndpoint::External("http://localhost:9515".into());
        assert!(endpoint.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary_is_startup_error() {
        let result = DriverProcess::spawn(
            Path::new("/nonexistent/transcheck-driver"),
            BrowserKind::Chromium,
            Duration::from_millis(100),
        )
        .await;
        assert!(matches!(result, Err(HarnessError::DriverStartup(_))));
    }
}
