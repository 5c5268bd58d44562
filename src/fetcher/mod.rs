use crate::client::{HttpTransport, JsonpTransport, Transport, TransportError};
use crate::config::AppConfig;
use crate::models::{PresentationState, ReadingDisplay, SensorReading};
use crate::sink::{CurrentData, PresentationSink};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Default auto-refresh period: 30 minutes.
pub const DEFAULT_REFRESH_MS: u64 = 1_800_000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("tenant identifier is empty")]
    EmptyTenant,

    #[error("both transports failed (primary: {primary}, fallback: {fallback})")]
    BothFailed {
        primary: TransportError,
        fallback: TransportError,
    },
}

/// Sensor endpoint for a tenant. Computed once at construction.
pub fn endpoint_url(tenant: &str) -> String {
    format!("https://{}.wakesys.com/api/sensors.php", tenant.trim())
}

/// Polls the tenant's sensor endpoint and projects each cycle's outcome
/// into the presentation sink. Owns the endpoint, the auto-refresh timer
/// and the cycle sequence counter.
///
/// Cycles may overlap when a fetch outlives the refresh period; each cycle
/// takes a sequence number at start and only the most recently started
/// cycle may apply its terminal state, stale outcomes are discarded.
pub struct PollingFetcher {
    tenant: String,
    endpoint: String,
    primary: Arc<dyn Transport>,
    fallback: Arc<dyn Transport>,
    sink: Arc<dyn PresentationSink>,
    sequence: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PollingFetcher {
    pub fn from_config(
        config: &AppConfig,
        sink: Arc<dyn PresentationSink>,
    ) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(config.widget.timeout);
        Ok(Self::with_transports(
            config.widget.tenant.clone(),
            sink,
            Arc::new(HttpTransport::new(timeout)?),
            Arc::new(JsonpTransport::new(timeout)?),
        ))
    }

    pub fn with_transports(
        tenant: impl Into<String>,
        sink: Arc<dyn PresentationSink>,
        primary: Arc<dyn Transport>,
        fallback: Arc<dyn Transport>,
    ) -> Self {
        let tenant = tenant.into();
        let endpoint = endpoint_url(&tenant);
        Self {
            tenant,
            endpoint,
            primary,
            fallback,
            sink,
            sequence: AtomicU64::new(0),
            timer: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One-time initialization: wait for the sink, run the initial cycle,
    /// then start the repeating timer.
    pub async fn setup(self: &Arc<Self>, refresh: Duration) {
        self.sink.wait_ready().await;
        self.fetch_cycle().await;
        self.start_auto_refresh(refresh);
    }

    /// One complete attempt: loading -> transport(s) -> success or error.
    /// Never fails towards the caller; failures are logged and projected.
    pub async fn fetch_cycle(&self) {
        let cycle = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        match self.try_fetch(cycle).await {
            Ok(reading) => {
                let display = ReadingDisplay::from(&reading);
                self.project(cycle, PresentationState::Success(display));
            }
            Err(e) => {
                match &e {
                    FetchError::EmptyTenant => warn!("cycle {}: {}", cycle, e),
                    FetchError::BothFailed { .. } => error!("cycle {}: {}", cycle, e),
                }
                self.project(cycle, PresentationState::Error);
            }
        }
    }

    async fn try_fetch(&self, cycle: u64) -> Result<SensorReading, FetchError> {
        if self.tenant.trim().is_empty() {
            // No network attempt at all
            return Err(FetchError::EmptyTenant);
        }

        self.sink.show_loading();
        debug!("cycle {}: fetching {}", cycle, self.endpoint);

        match self.primary.fetch(&self.endpoint).await {
            Ok(reading) => Ok(reading),
            Err(primary) => {
                warn!(
                    "cycle {}: primary transport failed ({}), trying JSONP fallback",
                    cycle, primary
                );
                self.fallback
                    .fetch(&self.endpoint)
                    .await
                    .map_err(|fallback| FetchError::BothFailed { primary, fallback })
            }
        }
    }

    // Terminal projection, fenced on the sequence counter: a cycle that is
    // no longer the newest one drops its outcome.
    fn project(&self, cycle: u64, state: PresentationState) {
        if cycle != self.sequence.load(Ordering::SeqCst) {
            debug!("cycle {}: superseded, discarding outcome", cycle);
            return;
        }
        match &state {
            PresentationState::Loading => self.sink.show_loading(),
            PresentationState::Success(display) => self.sink.show_reading(display),
            PresentationState::Error => self.sink.show_error(),
        }
    }

    /// Start (or restart) the repeating timer. Any previously running timer
    /// is cancelled first, so at most one is ever active.
    pub fn start_auto_refresh(self: &Arc<Self>, period: Duration) {
        let mut slot = self.timer.lock().unwrap();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        info!("Auto-refresh every {} ms", period.as_millis());
        let fetcher = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; the initial cycle has
            // already run during setup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                fetcher.fetch_cycle().await;
            }
        }));
    }

    /// Cancel the timer if one is active. Safe to call repeatedly or when
    /// no timer was ever started. In-flight cycles are not cancelled.
    pub fn stop_auto_refresh(&self) {
        if let Some(handle) = self.timer.lock().unwrap().take() {
            info!("Auto-refresh stopped");
            handle.abort();
        }
    }

    /// Read back the last-rendered projection from the sink. No side
    /// effects, no network.
    pub fn current_data(&self) -> CurrentData {
        self.sink.current()
    }
}
