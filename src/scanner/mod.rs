//! Scanner module - coordinates concurrent port probes.
//!
//! The [`ScanCoordinator`] resolves the target once, dispatches one probe per
//! port through a semaphore-bounded pool of tokio tasks, and folds the
//! outcomes into a port-ordered [`ScanResult`].

pub mod tcp;
pub mod traits;

use crate::error::{ConnectError, ScanError};
use crate::types::{Port, PortRange, ScanTarget};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use tcp::TcpProbe;
pub use traits::{PortStatus, ProbeOutcome, Prober};

/// Default number of probes in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Default per-probe deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(750);

/// Parameters of a single scan. Consumed by the coordinator when the scan
/// starts, so it cannot change mid-scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Hostname or IP literal to scan.
    pub host: String,
    /// Inclusive port range; may be empty.
    pub ports: PortRange,
    /// Maximum number of in-flight probes.
    pub concurrency: usize,
    /// Connect (and banner read) deadline per probe.
    pub timeout: Duration,
    /// Whether to attempt banner grabbing on open ports.
    pub grab_banners: bool,
}

impl ScanRequest {
    /// Create a request for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ports: PortRange::default(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            grab_banners: false,
        }
    }

    /// Set the port range.
    pub fn with_ports(mut self, ports: PortRange) -> Self {
        self.ports = ports;
        self
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable banner grabbing.
    pub fn with_banners(mut self, grab_banners: bool) -> Self {
        self.grab_banners = grab_banners;
        self
    }

    /// Reject requests that could never run.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Open ports found by a scan, strictly ascending by port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanResult(Vec<ProbeOutcome>);

impl ScanResult {
    /// Keep the open outcomes and order them by port.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        let mut open: Vec<ProbeOutcome> =
            outcomes.into_iter().filter(|o| o.is_open()).collect();
        open.sort_unstable_by_key(|o| o.port);
        open.dedup_by_key(|o| o.port);
        Self(open)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeOutcome> {
        self.0.iter()
    }

    /// The open port numbers, ascending.
    pub fn ports(&self) -> Vec<Port> {
        self.0.iter().map(|o| o.port).collect()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a ProbeOutcome;
    type IntoIter = std::slice::Iter<'a, ProbeOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Everything the presentation layer needs once a scan is done.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// The target as given and as resolved.
    pub target: ScanTarget,
    /// The requested range.
    pub ports: PortRange,
    /// How many probes produced an outcome. Equals the range length unless
    /// the scan was cancelled.
    pub ports_probed: usize,
    /// Number of open ports in `results`.
    pub open_count: usize,
    /// Wall-clock duration of the scan.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Whether the scan was interrupted before every port was probed.
    pub cancelled: bool,
    /// Open ports, ascending.
    pub results: ScanResult,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Runs a [`ScanRequest`] end to end.
///
/// Lifecycle: `Idle -> Dispatching -> InFlight -> Aggregating -> Done`.
/// Dispatching and in-flight probing overlap; a new probe starts whenever a
/// permit frees up.
pub struct ScanCoordinator {
    request: ScanRequest,
    cancel: CancellationToken,
    events: Option<UnboundedSender<ProbeOutcome>>,
}

impl ScanCoordinator {
    /// Create a coordinator for `request`.
    pub fn new(request: ScanRequest) -> Self {
        Self {
            request,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Stop dispatching and abandon in-flight probes when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stream every outcome to `events` as soon as its probe completes.
    pub fn with_events(mut self, events: UnboundedSender<ProbeOutcome>) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate the request, resolve the host and run a TCP connect scan.
    ///
    /// Fails only before probing starts; per-port failures are part of the
    /// report.
    pub async fn run(self) -> Result<ScanReport, ScanError> {
        self.request.validate()?;

        let target = ScanTarget::resolve(&self.request.host).await?;
        let probe = TcpProbe::new(target.ip, self.request.timeout, self.request.grab_banners);

        Ok(self.run_with(target, Arc::new(probe)).await)
    }

    /// Run dispatch and aggregation against an already-resolved target.
    pub async fn run_with<P>(self, target: ScanTarget, prober: Arc<P>) -> ScanReport
    where
        P: Prober + 'static,
    {
        let start = Instant::now();
        let ports = self.request.ports;

        info!(
            host = %target,
            ports = %ports,
            concurrency = self.request.concurrency,
            "starting scan"
        );

        let (outcomes, cancelled) = self.dispatch(prober).await;

        debug!(collected = outcomes.len(), "aggregating outcomes");
        let ports_probed = outcomes.len();
        let results = ScanResult::from_outcomes(outcomes);
        let elapsed = start.elapsed();

        info!(
            open = results.len(),
            probed = ports_probed,
            elapsed_ms = elapsed.as_millis() as u64,
            cancelled,
            "scan finished"
        );

        ScanReport {
            target,
            ports,
            ports_probed,
            open_count: results.len(),
            elapsed,
            cancelled,
            results,
        }
    }

    /// Probe every port of the range with at most `concurrency` probes in
    /// flight. Returns the outcomes in completion order and whether the scan
    /// was cancelled.
    async fn dispatch<P>(&self, prober: Arc<P>) -> (Vec<ProbeOutcome>, bool)
    where
        P: Prober + 'static,
    {
        let ports = self.request.ports;
        let permits = self.request.concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut in_flight = JoinSet::new();
        let mut pending = HashMap::with_capacity(ports.len());
        let mut outcomes = Vec::with_capacity(ports.len());
        let mut cancelled = false;

        debug!(total = ports.len(), "dispatching probes");

        for port in ports.iter() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let prober = Arc::clone(&prober);
            let events = self.events.clone();
            let handle = in_flight.spawn(async move {
                let outcome = prober.probe(port).await;
                drop(permit);
                if let Some(events) = events {
                    // The receiver going away only means nobody is watching.
                    let _ = events.send(outcome.clone());
                }
                outcome
            });
            pending.insert(handle.id(), port);
        }

        if cancelled {
            debug!(in_flight = in_flight.len(), "scan cancelled during dispatch");
            in_flight.abort_all();
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled(), if !cancelled => {
                    debug!(in_flight = in_flight.len(), "scan cancelled, abandoning probes");
                    cancelled = true;
                    in_flight.abort_all();
                    continue;
                }
                joined = in_flight.join_next_with_id() => joined,
            };

            let Some(joined) = joined else { break };

            match joined {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcomes.push(outcome);
                }
                Err(e) if e.is_cancelled() => {
                    pending.remove(&e.id());
                }
                Err(e) => {
                    let Some(port) = pending.remove(&e.id()) else {
                        continue;
                    };
                    warn!(%port, error = %e, "probe task failed");
                    let outcome = ProbeOutcome::failed(
                        port,
                        ConnectError::Other("probe task panicked".to_string()),
                    );
                    if let Some(events) = &self.events {
                        let _ = events.send(outcome.clone());
                    }
                    outcomes.push(outcome);
                }
            }
        }

        (outcomes, cancelled)
    }
}

/// Run a TCP connect scan with no observer and no external cancellation.
pub async fn scan(request: ScanRequest) -> Result<ScanReport, ScanError> {
    ScanCoordinator::new(request).run().await
}
