//! Jokenpo binary entrypoint wiring the console front-end to the shared room store.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jokenpo::{
    AppConfig, MatchError, MatchReport, MatchSession, MatchSettings, dao::room_store::RoomStore,
};

mod console;

use console::{Console, MenuChoice};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let mut console = Console::new();
    console.banner();

    let store = connect_store().await.context("connecting to the room store")?;
    console.connected();

    let session = match console.menu().await {
        MenuChoice::Host => MatchSession::host(store, config.settings.clone()).await,
        MenuChoice::Join => {
            let token = console.room_token().await;
            MatchSession::join(store, config.settings.clone(), &token).await
        }
        MenuChoice::Invalid => {
            console.invalid_option();
            return Ok(());
        }
    };

    let result = match session {
        Ok(session) => run_session(&mut console, session, &config.settings).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(Some(report)) => console.reveal(&report).await,
        Ok(None) => console.abandoned(),
        Err(err @ MatchError::StoreUnavailable(_)) => {
            return Err(err).context("room store failed mid-match");
        }
        Err(err) => console.failure(&err),
    }

    Ok(())
}

/// Drive one match to its end, abandoning the room if the user hits Ctrl+C.
async fn run_session(
    console: &mut Console,
    mut session: MatchSession,
    settings: &MatchSettings,
) -> Result<Option<MatchReport>, MatchError> {
    console.room_ready(&session);

    let played = tokio::select! {
        result = play_out(console, &mut session, settings) => Some(result),
        _ = shutdown_signal() => None,
    };

    match played {
        Some(result) => result.map(Some),
        None => {
            info!(room = %session.room(), "interrupted; abandoning match");
            if let Err(err) = session.abandon().await {
                warn!(error = %err, "failed to delete room on shutdown");
            }
            Ok(None)
        }
    }
}

async fn play_out(
    console: &mut Console,
    session: &mut MatchSession,
    settings: &MatchSettings,
) -> Result<MatchReport, MatchError> {
    console.waiting_for_opponent(settings.ready_timeout);
    session.wait_for_opponent().await?;

    let choice = console.move_choice().await;
    console.waiting_for_move();
    session.play(&choice).await
}

#[cfg(feature = "redis-store")]
async fn connect_store() -> anyhow::Result<Arc<dyn RoomStore>> {
    use jokenpo::dao::{
        room_store::redis::{RedisConfig, RedisRoomStore},
        storage::StorageError,
    };

    let config = RedisConfig::from_env();
    info!(url = %config.url, "connecting to Redis");
    let store = RedisRoomStore::connect(config)
        .await
        .map_err(StorageError::from)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis-store"))]
async fn connect_store() -> anyhow::Result<Arc<dyn RoomStore>> {
    anyhow::bail!("built without a shared room store backend; enable the `redis-store` feature")
}

/// Configure tracing so logs go to stderr and never interleave with prompts.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,jokenpo=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
