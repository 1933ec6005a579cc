use geoport_core::config::ConnectivityConfig;
use geoport_core::mechanism::{ConnectivityProbe, ProbeFlag};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use url::Url;

/// Extracts `host:port` from an http(s) base URL.
///
/// The port defaults to the scheme's well-known port. Returns `None` for
/// unparsable URLs, other schemes, or URLs without a host.
pub fn service_endpoint(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str().filter(|host| !host.is_empty())?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Background reachability observer for the override service.
///
/// Holds a shared [`ProbeFlag`] that a spawned task refreshes by attempting
/// a TCP connect every `interval`. The selector reads the flag without
/// waiting on the network.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    flag: ProbeFlag,
    endpoint: String,
    interval: Duration,
    connect_timeout: Duration,
}

impl ConnectivityMonitor {
    pub fn new(endpoint: impl Into<String>, config: &ConnectivityConfig) -> Self {
        Self {
            flag: ProbeFlag::new(false),
            endpoint: endpoint.into(),
            interval: Duration::from_secs(config.probe_interval_secs.max(1)),
            connect_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn flag(&self) -> ProbeFlag {
        self.flag.clone()
    }

    /// Attempts one connect, updates the flag, and returns the result.
    pub async fn check_once(&self) -> bool {
        let reachable = matches!(
            tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.endpoint)).await,
            Ok(Ok(_))
        );

        let previous = self.flag.set(reachable);
        if previous != reachable {
            tracing::info!(
                target: "geoport::connectivity",
                endpoint = %self.endpoint,
                reachable,
                "Override service reachability changed"
            );
        }
        reachable
    }

    /// Spawns the periodic check loop. Abort the handle to stop it.
    pub fn spawn(&self) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.interval);
            loop {
                ticker.tick().await;
                monitor.check_once().await;
            }
        })
    }
}

impl ConnectivityProbe for ConnectivityMonitor {
    fn is_reachable(&self) -> bool {
        self.flag.get()
    }
}
