use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use herald_catalog::{AppleClient, SpotifyClient, SpotifyCredentials, TokenCache};
use herald_core::AppConfig;
use herald_discord::DiscordClient;
use herald_feed::FeedClient;
use herald_server::{health_router, AnnounceSettings, Orchestrator};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "podherald", about = "Announces new podcast episodes in a Discord forum")]
struct Cli {
    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = herald_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let orchestrator = build_orchestrator(&config)?;

    if cli.once {
        return Ok(match orchestrator.run_cycle().await {
            Ok(outcome) => {
                tracing::info!(?outcome, "podherald: single cycle finished");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(phase = %e.phase, error = %e.source, "podherald: cycle failed");
                ExitCode::FAILURE
            }
        });
    }

    tracing::info!(
        feed_url = %config.feed_url,
        poll_interval_secs = config.poll_interval_secs,
        state = %config.state_location,
        "podherald: started"
    );

    let cancel = CancellationToken::new();
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "podherald: liveness endpoint listening");
    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, health_router())
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
    });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    orchestrator.run(config.poll_interval(), cancel.clone()).await;
    cancel.cancel();
    server.await??;
    Ok(ExitCode::SUCCESS)
}

fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let http = herald_catalog::build_http_client(config.http_timeout_secs, &config.user_agent)?;

    let feed = FeedClient::new(&config.feed_url, config.http_timeout_secs, &config.user_agent)?;
    let apple = AppleClient::new(http.clone(), &config.apple_show_id, &config.apple_country)?;
    let tokens = Arc::new(TokenCache::new(
        http.clone(),
        SpotifyCredentials {
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        },
    )?);
    let spotify = SpotifyClient::new(
        http.clone(),
        tokens,
        &config.spotify_show_id,
        &config.spotify_market,
    )?;
    let discord = DiscordClient::new(http, &config.discord_bot_token)?;
    let state = herald_state::from_location(&config.state_location)?;

    Ok(Orchestrator::new(
        Arc::new(feed),
        Arc::new(apple),
        Arc::new(spotify),
        Arc::new(discord),
        Arc::from(state),
        AnnounceSettings {
            show_name: config.show_name.clone(),
            channel_id: config.forum_channel_id.clone(),
            tag_ids: config.forum_tag_ids.clone(),
        },
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping poll loop");
}
