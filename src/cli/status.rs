//! Status and workers command implementations

use crate::cli::output::{
    format_availability_json, format_availability_table, format_performance_json,
    format_performance_table, format_status_json, format_status_table, format_system_json,
    format_system_table, LOADING_STATUS,
};
use crate::cli::{load_config_with_overrides, ClientArgs, ReportArgs, StatusArgs, WorkersArgs};
use crate::logging::init_tracing;
use crate::status::{NetworkStatus, Snapshot, StatusPoller};
use colored::Colorize;
use std::io::{IsTerminal, Write};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Wait for shutdown signal (SIGINT or SIGTERM), then cancel the token.
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, stopping");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, stopping");
        }
    }

    cancel_token.cancel();
}

/// Render one snapshot for the terminal or as JSON.
fn render_snapshot(statuses: &[NetworkStatus], json: bool) -> Result<String, serde_json::Error> {
    if json {
        // One compact document per line so `--watch --json` is NDJSON
        serde_json::to_string(&serde_json::json!({ "workers": statuses }))
    } else {
        Ok(format!(
            "{}\n{}",
            "Network Status".bold(),
            format_status_table(statuses)
        ))
    }
}

/// Handle `dllama status` command
pub async fn run_status(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_with_overrides(&args.client)?;
    if let Some(interval) = args.interval {
        config.status.interval_seconds = interval;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    let poller = StatusPoller::new(&config.api.base_url, config.status.clone())?;

    if !args.watch {
        let statuses = poller.fetch_all().await?;
        if args.json {
            println!("{}", format_status_json(&statuses)?);
        } else {
            println!("{}", render_snapshot(&statuses, false)?);
        }
        return Ok(());
    }

    let updates = poller.board().subscribe();
    let cancel_token = CancellationToken::new();
    let redraw = !args.json && std::io::stdout().is_terminal();

    tokio::spawn(shutdown_signal(cancel_token.clone()));
    let handle = poller.start(cancel_token.clone());

    if !args.json {
        println!("{}", LOADING_STATUS);
    }

    let result = watch_snapshots(
        updates,
        cancel_token.clone(),
        args.json,
        redraw,
        &mut std::io::stdout(),
    )
    .await;

    cancel_token.cancel();
    handle.await?;
    result
}

/// Render every snapshot published to the board until `cancel_token` fires.
pub async fn watch_snapshots<W: Write>(
    mut updates: watch::Receiver<Snapshot>,
    cancel_token: CancellationToken,
    json: bool,
    redraw: bool,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(statuses) = snapshot {
                    if redraw {
                        // Clear screen, cursor home
                        write!(out, "\x1B[2J\x1B[H")?;
                    }
                    writeln!(out, "{}", render_snapshot(&statuses, json)?)?;
                    out.flush()?;
                }
            }
        }
    }

    Ok(())
}

/// Build a poller for one-shot requests.
fn report_poller(client: &ClientArgs) -> Result<StatusPoller, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(client)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    Ok(StatusPoller::new(&config.api.base_url, config.status.clone())?)
}

/// Handle `dllama workers` command
pub async fn run_workers(args: WorkersArgs) -> Result<(), Box<dyn std::error::Error>> {
    let poller = report_poller(&args.client)?;
    let workers = poller.fetch_availability().await?;

    if args.json {
        println!("{}", format_availability_json(&workers)?);
    } else {
        println!("{}", format_availability_table(&workers));
    }

    Ok(())
}

/// Handle `dllama metrics` command
pub async fn run_metrics(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let poller = report_poller(&args.client)?;
    let report = poller.fetch_performance().await?;

    if args.json {
        println!("{}", format_performance_json(&report)?);
    } else {
        println!("{}", format_performance_table(&report));
    }

    Ok(())
}

/// Handle `dllama system` command
pub async fn run_system(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let poller = report_poller(&args.client)?;
    let status = poller.fetch_system().await?;

    if args.json {
        println!("{}", format_system_json(&status)?);
    } else {
        println!("{}", format_system_table(&status));
    }

    Ok(())
}
