//! Wiring & DI. Entry point: load configuration, bootstrap adapters, run the refresh loop.
//! No business logic here; resolution lives in the use cases.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tt_kiosk::adapters::clock::{FixedClock, SystemClock};
use tt_kiosk::adapters::publish::{DisplayJsonFile, DisplaySlot};
use tt_kiosk::adapters::sources::SourceFactory;
use tt_kiosk::adapters::ui::ConsoleStatus;
use tt_kiosk::ports::{Clock, DisplayFeed, DisplaySink};
use tt_kiosk::shared::config::Settings;
use tt_kiosk::usecases::{DisplayService, RefreshLoop, ServiceFactory};

/// Service built from a fresh configuration read. Used at start and on every reinitialisation.
fn build_service(client: &reqwest::Client) -> DisplayService {
    let settings = Settings::load();
    for issue in &settings.issues {
        warn!(issue = %issue, "configuration degraded");
    }
    let clock = clock_for(&settings);
    let factory = SourceFactory::new(
        client.clone(),
        settings.app.data_dir_or_default(),
        settings.rules.day_cycle.clone(),
        Arc::clone(&clock),
        settings.app.use_sample_data,
    );
    let [calendar, bells, lessons] = settings.app.descriptors(&settings.rules);
    DisplayService::new(
        factory.calendar(&calendar),
        factory.bell_schedule(&bells),
        factory.lessons(&lessons),
        Arc::new(settings.rules),
        clock,
        settings.degraded,
    )
}

fn clock_for(settings: &Settings) -> Arc<dyn Clock> {
    match settings.app.fixed_now() {
        Some(at) => Arc::new(FixedClock::new(at)),
        None => Arc::new(SystemClock),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load();
    let default_level = if settings.app.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tt_kiosk::adapters::ui::init_ui();

    for issue in &settings.issues {
        warn!(issue = %issue, "configuration degraded");
    }
    let data_dir = PathBuf::from(settings.app.data_dir_or_default());
    let output_path = data_dir.join(settings.app.output_path_or_default());
    if let Some(at) = settings.app.fixed_now() {
        info!(fixed_now = %at, "clock pinned");
    }
    info!(
        data_dir = %data_dir.display(),
        output = %output_path.display(),
        sample_data = settings.app.use_sample_data,
        "kiosk starting"
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("tt-kiosk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow::anyhow!("HTTP client: {}", e))?;

    let slot = Arc::new(DisplaySlot::new());
    let sinks: Vec<Arc<dyn DisplaySink>> = vec![
        Arc::clone(&slot) as Arc<dyn DisplaySink>,
        Arc::new(DisplayJsonFile::new(&output_path)),
        Arc::new(ConsoleStatus),
    ];

    let factory: ServiceFactory = {
        let client = client.clone();
        Arc::new(move || build_service(&client))
    };
    let refresh = RefreshLoop::new(
        factory,
        sinks,
        Arc::new(SystemClock),
        Duration::from_secs(settings.app.refresh_secs_or_default()),
        settings.app.reinit_hourly_or_default(),
        settings.app.daily_reset_at(),
    );

    if settings.app.once {
        refresh.run_once().await;
    } else {
        refresh
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
                    std::future::pending::<()>().await;
                }
            })
            .await;
    }

    if let Some(last) = slot.latest() {
        info!(state = ?last.state, "last published result");
    }
    Ok(())
}
