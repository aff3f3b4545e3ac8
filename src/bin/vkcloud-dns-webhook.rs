use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use axum::{Router, http::Uri};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use vkcloud_dns_webhook::{
    AppState, SharedState, api,
    config::{AppConfig, DEFAULT_API_BASE_URL, DEFAULT_SOLVER_NAME},
    solver::VkCloudSolver,
};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// API group the solver registers for (e.g. acme.example.com)
    #[arg(long, env = "GROUP_NAME", value_name = "GROUP")]
    group_name: String,
    /// Solver name used in the webhook path
    #[arg(long, value_name = "NAME", default_value = DEFAULT_SOLVER_NAME)]
    solver_name: String,
    /// Listen address for the webhook server
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8443")]
    listen: SocketAddr,
    /// Path to the TLS certificate file
    #[arg(long, value_name = "PATH", requires = "tls_private_key_file")]
    tls_cert_file: Option<PathBuf>,
    /// Path to the TLS private key file
    #[arg(long, value_name = "PATH", requires = "tls_cert_file")]
    tls_private_key_file: Option<PathBuf>,
    /// VK Cloud public DNS API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,
    /// Kubernetes API server URL (overrides in-cluster or kubeconfig discovery)
    #[arg(long, value_name = "URL")]
    kube_api_server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = build_app_config(&cli)?;
    let state = init_shared_state(&cli, config).await?;

    info!(
        group = %state.config.group_name,
        solver = %state.solver.name(),
        "solver initialized"
    );

    let app = api::create_router(state);

    match (&cli.tls_cert_file, &cli.tls_private_key_file) {
        (Some(cert), Some(key)) => serve_tls(cli.listen, app, cert, key).await,
        _ => serve_plain(cli.listen, app).await,
    }
}

fn build_app_config(cli: &Cli) -> Result<AppConfig> {
    let group_name = cli.group_name.trim();
    if group_name.is_empty() {
        bail!("GROUP_NAME must be specified");
    }
    let solver_name = cli.solver_name.trim();
    if solver_name.is_empty() {
        bail!("--solver-name cannot be empty");
    }

    let mut config = AppConfig::new(group_name).with_api_base_url(cli.api_base_url.trim());
    config.solver_name = solver_name.to_string();
    Ok(config)
}

async fn cluster_config(cli: &Cli) -> Result<kube::Config> {
    let mut cluster = kube::Config::infer()
        .await
        .context("failed to infer Kubernetes client configuration")?;
    if let Some(server) = &cli.kube_api_server {
        cluster.cluster_url = server
            .trim()
            .parse::<Uri>()
            .with_context(|| format!("invalid --kube-api-server URL {server}"))?;
    }
    Ok(cluster)
}

async fn init_shared_state(cli: &Cli, config: AppConfig) -> Result<SharedState> {
    let cluster = cluster_config(cli).await?;
    info!(api_server = %cluster.cluster_url, "using Kubernetes API server");

    let solver =
        VkCloudSolver::initialize(config.clone(), cluster).context("failed to initialize solver")?;

    Ok(Arc::new(AppState {
        config,
        solver: Arc::new(solver),
    }))
}

async fn serve_plain(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

async fn serve_tls(addr: SocketAddr, app: Router, cert: &Path, key: &Path) -> Result<()> {
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| {
            format!(
                "failed to load TLS material from {} / {}",
                cert.display(),
                key.display()
            )
        })?;

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        }
    });

    info!("listening on https://{}", addr);

    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("server exited with error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
