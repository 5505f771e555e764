use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use karma_bot::{Config, Dispatcher};
use karma_core::CounterStore;
use karma_slack::{SlackClient, SocketModeClient};
use karma_store::RedisCounterStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Required: SLACK_APP_TOKEN=xapp-..., SLACK_BOT_TOKEN=xoxb-...");
            eprintln!("Optional: SLACK_API_URL, KARMA_REDIS_URL, KARMA_FLUSH_ON_START, KARMA_EVENT_BUFFER");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting karma bot");
    tracing::info!("Slack API: {}", config.api_url);
    tracing::info!("Redis: {}", config.redis_url);

    // Make sure the bot token is good before doing anything else
    let api = SlackClient::new(
        config.api_url.clone(),
        config.app_token.clone(),
        config.bot_token.clone(),
    );
    match api.auth_test().await {
        Ok(identity) => tracing::info!(
            team = identity.team.as_deref().unwrap_or("?"),
            user = identity.user.as_deref().unwrap_or("?"),
            "Authenticated with Slack"
        ),
        Err(e) => {
            eprintln!("Failed to ensure the Slack client is authenticated: {}", e);
            std::process::exit(1);
        }
    }

    // Connect to the counter store
    let store = match RedisCounterStore::connect(&config.redis_url).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Redis connection error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.ping().await {
        eprintln!("Failed to ensure the Redis client is connected: {}", e);
        std::process::exit(1);
    }
    if config.flush_on_start {
        if let Err(e) = store.flush().await {
            eprintln!("Failed to flush Redis: {}", e);
            std::process::exit(1);
        }
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    // Start the dispatcher
    let (tx, rx) = mpsc::channel(config.event_buffer);
    let dispatcher = Dispatcher::new(rx, Arc::new(store));
    let dispatching = tokio::spawn(dispatcher.run(shutdown.clone()));

    // The socket owns the connection lifecycle until shutdown
    let socket = SocketModeClient::new(api);
    if let Err(e) = socket.run(tx, shutdown.clone()).await {
        tracing::error!(error = %e, "Failed to listen on socket");
        std::process::exit(1);
    }

    match dispatching.await {
        Ok(Ok(_)) => tracing::info!("Shut down cleanly"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Fell out of receiving events");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Dispatcher task failed");
            std::process::exit(1);
        }
    }
}

/// Cancel `shutdown` on SIGINT, SIGTERM or SIGQUIT.
#[cfg(unix)]
async fn wait_for_signal(shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let handlers = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    );

    match handlers {
        (Ok(mut int), Ok(mut term), Ok(mut quit)) => {
            tokio::select! {
                _ = int.recv() => {}
                _ = term.recv() => {}
                _ = quit.recv() => {}
            }
        }
        _ => {
            tracing::warn!("Failed to install signal handlers, falling back to Ctrl-C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    tracing::info!("Received shutdown signal, closing socket");
    shutdown.cancel();
}

#[cfg(not(unix))]
async fn wait_for_signal(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Received shutdown signal, closing socket");
    shutdown.cancel();
}
