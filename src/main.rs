// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{routing::get, Router};
use futures::StreamExt;
use kube::runtime::{controller::Action, reflector, watcher::Config, Controller};
use kube::{Api, Client, ResourceExt};
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder};
use pdns_operator::{
    constants::{
        DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_VHOST, DEFAULT_LEASE_DURATION_SECS,
        DEFAULT_LEASE_RETRY_PERIOD_SECS, ERROR_REQUEUE_DURATION_SECS, KIND_PDNS_PROVIDER,
        METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, METRICS_SERVER_PORT,
        TOKIO_WORKER_THREADS,
    },
    context::{spawn_reflector, Context, Stores},
    crd::{ClusterRRset, ClusterZone, PDNSProvider, RRset, Zone},
    generic::{GenericRRset, GenericZone},
    metrics,
    pdns::PdnsClient,
    reconcilers::{
        reconcile_provider, reconcile_rrset, reconcile_zone, resolver::legacy_http_client,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("pdns-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging with custom format
///
/// Respects `RUST_LOG` environment variable if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` environment variable for output format (json or text).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting PowerDNS Operator");
}

/// Build the process-wide legacy PowerDNS client from environment
/// variables, if configured.
///
/// This is the transitional path predating `PDNSProvider` resources; zones
/// without a `providerRef` fall back to it. With no `PDNS_API_URL` and
/// `PDNS_API_KEY` the operator runs provider-only.
fn initialize_legacy_client() -> Result<Option<PdnsClient>> {
    let api_url = std::env::var("PDNS_API_URL").unwrap_or_default();
    let api_key = std::env::var("PDNS_API_KEY").unwrap_or_default();

    if api_url.is_empty() || api_key.is_empty() {
        info!("Legacy PowerDNS configuration not set, running in provider-only mode");
        return Ok(None);
    }

    let vhost =
        std::env::var("PDNS_API_VHOST").unwrap_or_else(|_| DEFAULT_API_VHOST.to_string());

    let timeout = std::env::var("PDNS_API_TIMEOUT")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|t| *t > 0)
        .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

    let insecure = std::env::var("PDNS_API_INSECURE")
        .ok()
        .and_then(|s| s.parse::<bool>().ok())
        .unwrap_or(false);
    if insecure {
        info!("the communication with PowerDNS API is set as insecure");
    }

    let ca_path = std::env::var("PDNS_API_CA_PATH").ok();

    let http = legacy_http_client(Duration::from_secs(timeout), insecure, ca_path.as_deref())?;

    info!(url = %api_url, vhost = %vhost, "Legacy PowerDNS API client configured");
    Ok(Some(PdnsClient::new(&api_url, &vhost, &api_key, http)))
}

/// Start the Prometheus metrics and health HTTP server
///
/// Serves `/metrics`, `/healthz` and `/readyz` on the configured port
/// (default: 0.0.0.0:8080). HTTP/1.1 only.
///
/// # Returns
/// A `JoinHandle` that can be used to monitor the server task
fn start_metrics_server() -> tokio::task::JoinHandle<()> {
    info!(
        bind_address = METRICS_SERVER_BIND_ADDRESS,
        port = METRICS_SERVER_PORT,
        path = METRICS_SERVER_PATH,
        "Starting Prometheus metrics HTTP server"
    );

    tokio::spawn(async move {
        async fn metrics_handler() -> String {
            match metrics::gather_metrics() {
                Ok(metrics_text) => metrics_text,
                Err(e) => {
                    error!("Failed to gather metrics: {}", e);
                    String::from("# Error gathering metrics\n")
                }
            }
        }

        async fn health_handler() -> &'static str {
            "ok"
        }

        let app = Router::new()
            .route(METRICS_SERVER_PATH, get(metrics_handler))
            .route("/healthz", get(health_handler))
            .route("/readyz", get(health_handler));

        let bind_addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}");
        let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind metrics server to {bind_addr}: {e}");
                return;
            }
        };

        info!("Metrics server listening on http://{bind_addr}{METRICS_SERVER_PATH}");

        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {e}");
        }
    })
}

/// Leader election configuration
struct LeaderElectionConfig {
    enabled: bool,
    lease_name: String,
    lease_namespace: String,
    identity: String,
    lease_duration: u64,
    retry_period: u64,
}

/// Load leader election configuration from environment variables
fn load_leader_election_config() -> LeaderElectionConfig {
    let enabled = std::env::var("PDNS_OPERATOR_ENABLE_LEADER_ELECTION")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);

    let lease_name = std::env::var("PDNS_OPERATOR_LEASE_NAME")
        .unwrap_or_else(|_| "pdns-operator-leader".to_string());

    let lease_namespace = std::env::var("PDNS_OPERATOR_LEASE_NAMESPACE")
        .or_else(|_| std::env::var("POD_NAMESPACE"))
        .unwrap_or_else(|_| "dns-system".to_string());

    let lease_duration = std::env::var("PDNS_OPERATOR_LEASE_DURATION_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LEASE_DURATION_SECS);

    let retry_period = std::env::var("PDNS_OPERATOR_LEASE_RETRY_PERIOD_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LEASE_RETRY_PERIOD_SECS);

    let identity = std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| format!("pdns-operator-{}", rand::random::<u32>()));

    LeaderElectionConfig {
        enabled,
        lease_name,
        lease_namespace,
        identity,
        lease_duration,
        retry_period,
    }
}

/// Create a default watcher configuration.
///
/// Zone controllers watch all changes including status updates: a parent
/// zone must wake up when its own status advances so Failed zones retry.
#[inline]
fn default_watcher_config() -> Config {
    Config::default()
}

/// Create a semantic watcher configuration.
///
/// Record set controllers only trigger on semantic changes (spec
/// modifications), ignoring status-only updates. This prevents
/// reconciliation loops when controllers update status fields.
#[inline]
fn semantic_watcher_config() -> Config {
    Config::default().any_semantic()
}

/// Build the shared context: client, legacy handle and the reflector
/// stores backing the FQDN uniqueness indexer.
fn build_context(client: Client, legacy_client: Option<PdnsClient>) -> Arc<Context> {
    let (zones, zones_writer) = reflector::store::<Zone>();
    let _ = spawn_reflector(Api::<Zone>::all(client.clone()), zones_writer);

    let (cluster_zones, cluster_zones_writer) = reflector::store::<ClusterZone>();
    let _ = spawn_reflector(Api::<ClusterZone>::all(client.clone()), cluster_zones_writer);

    let (rrsets, rrsets_writer) = reflector::store::<RRset>();
    let _ = spawn_reflector(Api::<RRset>::all(client.clone()), rrsets_writer);

    let (cluster_rrsets, cluster_rrsets_writer) = reflector::store::<ClusterRRset>();
    let _ = spawn_reflector(
        Api::<ClusterRRset>::all(client.clone()),
        cluster_rrsets_writer,
    );

    Arc::new(Context {
        client,
        stores: Stores {
            zones,
            cluster_zones,
            rrsets,
            cluster_rrsets,
        },
        legacy_client,
    })
}

async fn async_main() -> Result<()> {
    initialize_logging();

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let legacy_client = initialize_legacy_client()?;

    // Start the metrics HTTP server
    let _metrics_handle = start_metrics_server();

    let ctx = build_context(client.clone(), legacy_client);

    let config = load_leader_election_config();

    if config.enabled {
        info!(
            lease_name = %config.lease_name,
            lease_namespace = %config.lease_namespace,
            identity = %config.identity,
            lease_duration_secs = config.lease_duration,
            "Leader election enabled"
        );

        // Create and start lease manager for leader election
        // The manager returns a watch receiver (to monitor leadership status)
        // and a join handle (to monitor the lease renewal task)
        info!("Starting leader election, waiting to acquire leadership...");

        let lease_manager = LeaseManagerBuilder::new(client.clone(), &config.lease_name)
            .with_namespace(&config.lease_namespace)
            .with_identity(&config.identity)
            .with_duration(config.lease_duration)
            .with_grace(config.retry_period)
            .build()
            .await?;

        let (leader_rx, lease_handle) = lease_manager.watch().await;

        // Wait until we become leader
        let mut rx = leader_rx.clone();
        while !*rx.borrow_and_update() {
            rx.changed().await?;
        }

        info!("Leadership acquired, starting controllers");

        run_controllers_with_leader_election(ctx, leader_rx, lease_handle).await?;
    } else {
        run_controllers_without_leader_election(ctx).await?;
    }

    Ok(())
}

/// Monitor leadership status - returns when leadership is lost or an error occurs
async fn monitor_leadership(
    mut leader_rx: tokio::sync::watch::Receiver<bool>,
) -> Result<(), anyhow::Error> {
    loop {
        leader_rx.changed().await?;
        if !*leader_rx.borrow() {
            // Leadership lost
            return Ok(());
        }
    }
}

/// Run controllers with leader election
///
/// This function runs all controllers while monitoring leadership status and handling
/// signals. If leadership is lost or SIGTERM/SIGINT is received, all controllers are
/// stopped and the process exits gracefully. The lease is never released voluntarily
/// while reconciles are in flight; dropping the renewal task on exit lets the lease
/// expire on its own.
async fn run_controllers_with_leader_election(
    ctx: Arc<Context>,
    leader_rx: tokio::sync::watch::Receiver<bool>,
    _lease_handle: tokio::task::JoinHandle<
        Result<LeaseManager, kube_lease_manager::LeaseManagerError>,
    >,
) -> Result<()> {
    info!("Running controllers with leader election and signal handling");

    let shutdown_result: Result<()> = tokio::select! {
        // Monitor for SIGINT (Ctrl+C)
        result = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            result.map_err(anyhow::Error::from)
        }

        // Monitor for SIGTERM (Kubernetes sends this when deleting pods)
        result = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                sigterm.recv().await;
                Ok::<(), anyhow::Error>(())
            }
            #[cfg(not(unix))]
            {
                // On non-Unix platforms, just wait forever
                std::future::pending::<()>().await;
                Ok::<(), anyhow::Error>(())
            }
        } => {
            info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            result
        }

        // Monitor leadership - if lost, stop all controllers
        result = monitor_leadership(leader_rx) => {
            match result {
                Ok(()) => {
                    warn!("Leadership lost! Stopping all controllers...");
                    anyhow::bail!("Leadership lost - stepping down")
                }
                Err(e) => {
                    error!("Leadership monitor error: {:?}", e);
                    anyhow::bail!("Leadership monitoring failed: {e}")
                }
            }
        }

        // Run all controllers
        result = run_all_controllers(ctx) => {
            result
        }
    };

    shutdown_result?;
    info!("Graceful shutdown completed successfully");
    Ok(())
}

/// Run all controllers without leader election, with signal handling
async fn run_controllers_without_leader_election(ctx: Arc<Context>) -> Result<()> {
    warn!("Leader election DISABLED - running without high availability");
    info!("Starting all controllers with signal handling");

    let shutdown_result: Result<()> = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            result.map_err(anyhow::Error::from)
        }

        result = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())?;
                sigterm.recv().await;
                Ok::<(), anyhow::Error>(())
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
                Ok::<(), anyhow::Error>(())
            }
        } => {
            info!("Received SIGTERM (pod termination), initiating graceful shutdown...");
            result
        }

        result = run_all_controllers(ctx) => {
            result
        }
    };

    shutdown_result?;
    info!("Graceful shutdown completed successfully");

    Ok(())
}

/// Run all controllers
///
/// Controllers should never exit - if one does, we log it and exit the
/// main process so the pod restarts in a clean state.
async fn run_all_controllers(ctx: Arc<Context>) -> Result<()> {
    tokio::select! {
        result = run_provider_controller(ctx.clone()) => {
            error!("CRITICAL: PDNSProvider controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("PDNSProvider controller exited unexpectedly without error")
        }
        result = run_zone_controller::<Zone>(ctx.clone()) => {
            error!("CRITICAL: Zone controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Zone controller exited unexpectedly without error")
        }
        result = run_zone_controller::<ClusterZone>(ctx.clone()) => {
            error!("CRITICAL: ClusterZone controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("ClusterZone controller exited unexpectedly without error")
        }
        result = run_rrset_controller::<RRset>(ctx.clone()) => {
            error!("CRITICAL: RRset controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("RRset controller exited unexpectedly without error")
        }
        result = run_rrset_controller::<ClusterRRset>(ctx.clone()) => {
            error!("CRITICAL: ClusterRRset controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("ClusterRRset controller exited unexpectedly without error")
        }
    }
}

/// Run the `PDNSProvider` controller
async fn run_provider_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting PDNSProvider controller");

    let api = Api::<PDNSProvider>::all(ctx.client.clone());

    Controller::new(api, default_watcher_config())
        .run(reconcile_provider_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run a zone controller for either scope.
///
/// Zones own their record sets through controller owner references, so
/// both record set kinds are registered as owned children: a child event
/// re-triggers the owning zone.
async fn run_zone_controller<Z: GenericZone>(ctx: Arc<Context>) -> Result<()> {
    info!(kind = Z::KIND, "Starting zone controller");

    let api = Z::all_api(ctx.client.clone());
    let rrset_api = Api::<RRset>::all(ctx.client.clone());
    let cluster_rrset_api = Api::<ClusterRRset>::all(ctx.client.clone());

    Controller::new(api, default_watcher_config())
        .owns(rrset_api, default_watcher_config())
        .owns(cluster_rrset_api, default_watcher_config())
        .run(reconcile_zone_wrapper::<Z>, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run a record set controller for either scope.
async fn run_rrset_controller<R: GenericRRset>(ctx: Arc<Context>) -> Result<()> {
    info!(kind = R::KIND, "Starting record set controller");

    let api = R::all_api(ctx.client.clone());

    // Configure controller to only watch for spec changes, not status updates
    // This prevents reconciliation loops when we update status
    let watcher_config = semantic_watcher_config();

    Controller::new(api, watcher_config)
        .run(reconcile_rrset_wrapper::<R>, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `PDNSProvider`
async fn reconcile_provider_wrapper(
    provider: Arc<PDNSProvider>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_provider(provider.clone(), ctx).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_PDNS_PROVIDER, duration);
            Ok(action)
        }
        Err(e) => {
            error!(
                "Failed to reconcile PDNSProvider {}: {}",
                provider.name_any(),
                e
            );
            metrics::record_reconciliation_error(KIND_PDNS_PROVIDER, duration);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for zones of either scope
async fn reconcile_zone_wrapper<Z: GenericZone>(
    zone: Arc<Z>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_zone(zone.clone(), ctx).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            metrics::record_reconciliation_success(Z::KIND, duration);
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile {} {}: {}", Z::KIND, zone.name_any(), e);
            metrics::record_reconciliation_error(Z::KIND, duration);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for record sets of either scope
async fn reconcile_rrset_wrapper<R: GenericRRset>(
    rrset: Arc<R>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = std::time::Instant::now();

    let result = reconcile_rrset(rrset.clone(), ctx).await;
    let duration = start.elapsed();

    match result {
        Ok(action) => {
            metrics::record_reconciliation_success(R::KIND, duration);
            Ok(action)
        }
        Err(e) => {
            error!("Failed to reconcile {} {}: {}", R::KIND, rrset.name_any(), e);
            metrics::record_reconciliation_error(R::KIND, duration);
            Err(e.into())
        }
    }
}

/// Generic error policy for all controllers.
///
/// Reconciliation errors requeue after a fixed delay; controller-runtime
/// applies its own exponential back-off on repeated failures.
fn error_policy<T>(_resource: Arc<T>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action
where
    T: std::fmt::Debug,
{
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
