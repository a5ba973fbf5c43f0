//! BridgeService - owns the queue, the publish loop and the HTTP listener

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use codec::select_encoders;
use config_loader::ConfigLoader;
use contracts::{BridgeConfig, BrokerClient};
use dispatcher::{dispatch_queue, Producer, PublishLoop, PublishMetrics, PublishSnapshot};
use ingestion::{build_router, HttpListener, IngestState, IngestionMetrics};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::ServiceError;
use crate::report::ShutdownReport;
use crate::state::ServiceState;

/// Handles held while the service runs
struct RunningParts {
    shutdown: CancellationToken,
    local_addr: SocketAddr,
    publish_task: JoinHandle<()>,
    server_task: JoinHandle<io::Result<()>>,
    publish_metrics: Arc<PublishMetrics>,
    ingestion_metrics: Arc<IngestionMetrics>,
    started_at: Instant,
}

/// One bridge instance: HTTP endpoint → dispatch queue → publish loop → broker client
pub struct BridgeService<B> {
    config: BridgeConfig,
    client: Arc<B>,
    state: ServiceState,
    running: Option<RunningParts>,
}

impl<B> BridgeService<B>
where
    B: BrokerClient + Sync + 'static,
{
    pub fn new(config: BridgeConfig, client: B) -> Self {
        Self {
            config,
            client: Arc::new(client),
            state: ServiceState::Created,
            running: None,
        }
    }

    /// Load the configuration file at `path` and build a service around it
    pub fn from_path(path: &Path, client: B) -> Result<Self, ServiceError> {
        let config = ConfigLoader::load_from_path(path)?;
        Ok(Self::new(config, client))
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<B> {
        &self.client
    }

    /// Address the HTTP listener is bound to, while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Current publish counters, while running
    pub fn publish_snapshot(&self) -> Option<PublishSnapshot> {
        self.running.as_ref().map(|r| r.publish_metrics.snapshot())
    }

    /// Bind the listener, open the queue and start the publish loop.
    ///
    /// Returns the bound address. On failure nothing keeps running and the
    /// service stays `Created`.
    #[instrument(name = "bridge_start", skip(self), fields(topic = %self.config.topic))]
    pub async fn start(&mut self) -> Result<SocketAddr, ServiceError> {
        if !self.state.can_start() {
            return Err(ServiceError::invalid_state("start", self.state));
        }

        config_loader::validate(&self.config)
            .map_err(|e| ServiceError::startup("config validation", e))?;

        // Selected once; immutable for the lifetime of this run
        let encoders =
            select_encoders(&self.config).map_err(|e| ServiceError::startup("encoder selection", e))?;

        let listener = HttpListener::bind(&self.config.http)
            .await
            .map_err(|e| ServiceError::startup("listener bind", e))?;
        let local_addr = listener.local_addr();

        let mode = self.config.encoding_mode();
        let shutdown = CancellationToken::new();
        let (tx, rx) = dispatch_queue();

        let publish_loop = PublishLoop::new(
            self.config.topic.clone(),
            Producer::new(Arc::clone(&self.client), encoders),
            rx,
            shutdown.clone(),
        );
        let publish_metrics = publish_loop.metrics();
        let publish_task = publish_loop.spawn();

        let state = IngestState::new(tx, mode, self.config.http.overload);
        let ingestion_metrics = state.metrics();
        let router = build_router(&self.config.http, mode, state);
        let server_task = listener.spawn(router, shutdown.clone());

        self.running = Some(RunningParts {
            shutdown,
            local_addr,
            publish_task,
            server_task,
            publish_metrics,
            ingestion_metrics,
            started_at: Instant::now(),
        });
        self.state = ServiceState::Running;

        info!(
            addr = %local_addr,
            topic = %self.config.topic,
            mode = %mode,
            client = self.client.name(),
            "Bridge service running"
        );
        Ok(local_addr)
    }

    /// Close intake, drain the publish loop and close the broker client.
    ///
    /// The whole sequence is bounded by `shutdown_drain_timeout_ms`; stages
    /// still running at the deadline are abandoned.
    #[instrument(name = "bridge_stop", skip(self), fields(topic = %self.config.topic))]
    pub async fn stop(&mut self) -> Result<ShutdownReport, ServiceError> {
        if !self.state.can_stop() {
            return Err(ServiceError::invalid_state("stop", self.state));
        }
        let Some(parts) = self.running.take() else {
            return Err(ServiceError::invalid_state("stop", self.state));
        };
        self.state = ServiceState::Stopping;

        let bound = self.config.drain_timeout();
        let begun = Instant::now();
        let deadline = begun + bound;
        info!(drain_timeout_ms = bound.as_millis() as u64, "Stopping bridge service");

        // Stops HTTP accept and closes the queue at the same time
        parts.shutdown.cancel();

        let mut report = ShutdownReport {
            uptime: begun.duration_since(parts.started_at),
            ..Default::default()
        };

        let mut publish_task = parts.publish_task;
        match timeout_at(deadline, &mut publish_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Publish loop task failed"),
            Err(_) => {
                warn!("Publish loop did not drain in time, aborting");
                publish_task.abort();
                report.drain_timed_out = true;
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, self.client.close(remaining)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Broker client close failed");
                report.close_error = Some(e.to_string());
            }
            Err(_) => {
                warn!(timeout_ms = remaining.as_millis() as u64, "Broker client close timed out");
                report.close_timed_out = true;
            }
        }

        let mut server_task = parts.server_task;
        match timeout_at(deadline, &mut server_task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, "HTTP listener ended with error"),
            Ok(Err(e)) => error!(error = %e, "HTTP listener task failed"),
            Err(_) => {
                warn!("HTTP listener still busy at deadline, aborting");
                server_task.abort();
            }
        }

        let publish = parts.publish_metrics.snapshot();
        report.published = publish.published;
        report.failed = publish.failed;
        report.encode_failures = publish.encode_failures;
        report.requests = parts.ingestion_metrics.snapshot().requests;
        report.elapsed = begun.elapsed();

        self.state = ServiceState::Stopped;
        info!(
            published = report.published,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            clean = report.is_clean(),
            "Bridge service stopped"
        );
        Ok(report)
    }

    /// Start, wait for `signal`, then stop
    pub async fn run_until<F>(&mut self, signal: F) -> Result<ShutdownReport, ServiceError>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        signal.await;
        info!("Shutdown signal received");
        self.stop().await
    }
}

impl<B> Drop for BridgeService<B> {
    fn drop(&mut self) {
        // Dropped while running: no bounded drain and the client is never closed
        if let Some(parts) = self.running.take() {
            warn!(
                addr = %parts.local_addr,
                topic = %self.config.topic,
                "Bridge service dropped while running; call stop() for a bounded drain"
            );
            parts.shutdown.cancel();
        }
    }
}
