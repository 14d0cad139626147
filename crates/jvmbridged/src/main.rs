//! jvmbridged — runtime counters as Prometheus metrics.
//!
//! # Usage
//!
//! ```text
//! jvmbridged serve --config /etc/jvmbridge/jvmbridge.toml
//! jvmbridged serve --snapshot /var/run/jvmbridge/snapshot.json --pid 4242
//! jvmbridged render --demo
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use jvmbridge_core::BridgeConfig;
use jvmbridge_introspect::{Introspection, StaticIntrospection};
use jvmbridge_metrics::{GaugeRegistry, RegistrationReport, register_runtime_metrics_with};
use jvmbridged::cli::{Cli, Command, SourceArgs};
use jvmbridged::{build_router, demo, render_after, source};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,jvmbridged=debug,jvmbridge=debug"))?,
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { source, listen } => serve(source, listen).await,
        Command::Render { source, window_ms } => render(source, window_ms).await,
    }
}

struct Setup {
    config: BridgeConfig,
    registry: GaugeRegistry,
    report: RegistrationReport,
    demo_source: Option<StaticIntrospection>,
}

/// Resolve the config and register every enabled series.
fn setup(args: &SourceArgs) -> anyhow::Result<Setup> {
    let config = args.resolve()?;

    let (introspection, demo_source) = if args.demo {
        let seeded = demo::seeded();
        let introspection: Arc<dyn Introspection> = Arc::new(seeded.clone());
        (introspection, Some(seeded))
    } else {
        (source::from_config(&config)?, None)
    };

    let registry = GaugeRegistry::new();
    let report = register_runtime_metrics_with(&registry, introspection, config.collect);
    Ok(Setup {
        config,
        registry,
        report,
        demo_source,
    })
}

async fn render(args: SourceArgs, window_ms: u64) -> anyhow::Result<()> {
    let Setup { registry, report, .. } = setup(&args)?;
    let window = if report.cpu_registered {
        Duration::from_millis(window_ms)
    } else {
        Duration::ZERO
    };
    debug!(?window, "sampling");
    print!("{}", render_after(&registry, window).await?);
    Ok(())
}

async fn serve(args: SourceArgs, listen: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    let Setup {
        config,
        registry,
        demo_source,
        ..
    } = setup(&args)?;
    let addr = listen.unwrap_or(config.exporter.listen);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let demo_handle = demo_source.map(|seeded| {
        tokio::spawn(demo::run(seeded, Duration::from_secs(1), shutdown_rx.clone()))
    });

    let router = build_router(registry);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "exporter listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Some(handle) = demo_handle {
        let _ = handle.await;
    }
    info!("jvmbridged stopped");
    Ok(())
}
