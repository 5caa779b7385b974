//! TCP connect probe.
//!
//! Determines reachability with a plain `connect()` through the operating
//! system's socket API, bounded by a hard deadline.

use crate::banner::grab_banner;
use crate::error::ConnectError;
use crate::scanner::traits::{ProbeOutcome, Prober};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// TCP connect probe for a single resolved target.
///
/// Does not require elevated privileges. Each call owns its own socket, which
/// is closed before the call returns.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    target: IpAddr,
    timeout: Duration,
    grab_banners: bool,
}

impl TcpProbe {
    /// Create a new TCP probe.
    ///
    /// # Arguments
    /// * `target` - Target IP address
    /// * `timeout` - Deadline for the connect and for the banner exchange
    /// * `grab_banners` - Whether to attempt banner grabbing on open ports
    pub fn new(target: IpAddr, timeout: Duration, grab_banners: bool) -> Self {
        Self {
            target,
            timeout,
            grab_banners,
        }
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ConnectError> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify_connect_error(&e)),
            Err(_) => Err(ConnectError::TimedOut),
        }
    }
}

#[async_trait]
impl Prober for TcpProbe {
    async fn probe(&self, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());
        let start = Instant::now();

        let mut stream = match self.attempt_connect(addr).await {
            Ok(stream) => stream,
            Err(e) => {
                debug!(%addr, error = %e, "connect failed");
                return ProbeOutcome::failed(port, e);
            }
        };
        let response_time = start.elapsed().as_millis() as u64;

        let banner = if self.grab_banners {
            grab_banner(&mut stream, self.timeout)
                .await
                .unwrap_or_else(|e| {
                    debug!(%addr, error = %e, "banner exchange failed");
                    None
                })
        } else {
            None
        };

        ProbeOutcome::open(port)
            .with_banner(banner)
            .with_response_time(response_time)
    }
}

/// Map an OS connect error onto a connect-error kind.
fn classify_connect_error(e: &io::Error) -> ConnectError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => return ConnectError::Refused,
        io::ErrorKind::TimedOut => return ConnectError::TimedOut,
        _ => {}
    }

    let message = e.to_string().to_lowercase();
    if message.contains("unreachable") {
        if message.contains("host") {
            ConnectError::HostUnreachable
        } else {
            ConnectError::NetworkUnreachable
        }
    } else {
        ConnectError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::traits::PortStatus;
    use std::net::Ipv4Addr;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn localhost_probe(grab_banners: bool) -> TcpProbe {
        TcpProbe::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            Duration::from_millis(500),
            grab_banners,
        )
    }

    #[test]
    fn test_classify_refused() {
        let e = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify_connect_error(&e), ConnectError::Refused);
    }

    #[test]
    fn test_classify_unreachable_message() {
        let e = io::Error::new(io::ErrorKind::Other, "No route to host: Host unreachable");
        assert_eq!(classify_connect_error(&e), ConnectError::HostUnreachable);

        let e = io::Error::new(io::ErrorKind::Other, "Network is unreachable");
        assert_eq!(classify_connect_error(&e), ConnectError::NetworkUnreachable);
    }

    #[tokio::test]
    async fn test_probe_open_port_without_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let outcome = localhost_probe(false).probe(port).await;

        assert_eq!(outcome.port, port);
        assert!(outcome.is_open());
        assert_eq!(outcome.banner, None);
        assert!(outcome.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn test_probe_reads_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"HELLO\r\n").await.unwrap();
        });

        let outcome = localhost_probe(true).probe(port).await;

        assert!(outcome.is_open());
        assert_eq!(outcome.banner.as_deref(), Some("HELLO"));
    }

    #[tokio::test]
    async fn test_probe_silent_service_stays_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let outcome = localhost_probe(true).probe(port).await;

        assert!(outcome.is_open());
        assert_eq!(outcome.banner, None);
        server.abort();
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then drop to get a port that is very likely unused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let outcome = localhost_probe(false).probe(Port::new(port).unwrap()).await;

        assert!(!outcome.is_open());
        assert!(matches!(
            outcome.status,
            PortStatus::Closed | PortStatus::Errored(_)
        ));
        assert!(outcome.error().is_some());
    }
}
