#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::net::SocketAddr;

    use anyhow::Context;
    use renovation_tracker::{AppConfig, Tracker, http_api};
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load().context("loading configuration")?;
    let addr: SocketAddr = config
        .server
        .addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.addr))?;

    let state = open_state(&config, Tracker::with_calendar(config.work_calendar()))?;
    println!("renovation-tracker HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(all(feature = "http_api", feature = "sqlite"))]
fn open_state(
    config: &renovation_tracker::AppConfig,
    empty: renovation_tracker::Tracker,
) -> anyhow::Result<renovation_tracker::http_api::AppState> {
    use anyhow::Context;
    use renovation_tracker::http_api::AppState;
    use renovation_tracker::persistence::TrackerStore;
    use renovation_tracker::persistence::sqlite::SqliteTrackerStore;
    use std::sync::Arc;

    let path = &config.storage.sqlite_path;
    let store = SqliteTrackerStore::new(path)
        .with_context(|| format!("opening sqlite database {}", path.display()))?;
    let tracker = match store.load_tracker()? {
        Some(mut tracker) => {
            tracing::info!(path = %path.display(), "restored tracker from sqlite");
            tracker.set_calendar(empty.calendar().clone());
            tracker
        }
        None => empty,
    };
    Ok(AppState::new(tracker).with_store(Arc::new(store)))
}

#[cfg(all(feature = "http_api", not(feature = "sqlite")))]
fn open_state(
    _config: &renovation_tracker::AppConfig,
    empty: renovation_tracker::Tracker,
) -> anyhow::Result<renovation_tracker::http_api::AppState> {
    tracing::warn!("built without the `sqlite` feature; data lives in memory only");
    Ok(renovation_tracker::http_api::AppState::new(empty))
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
