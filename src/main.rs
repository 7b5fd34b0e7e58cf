use consultation_ai::traits::transcription::Provider;
use domain::booking::DatabaseBookingStore;
use domain::cache::{Clock, SystemClock};
use domain::directory::DatabaseUserDirectory;
use domain::gateway::assembly_ai::AssemblyAiProvider;
use domain::notification::{EventNotificationSink, NotificationRecorder};
use domain::reminder::{ReminderDispatcher, ReminderScheduler};
use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting consultation platform [{}] ({})...",
        config.runtime_env(),
        env!("CARGO_PKG_VERSION")
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &db);

    check_transcription_provider(&app_state.config).await;

    let scheduler = build_reminder_scheduler(&app_state);
    let cancel = CancellationToken::new();
    let jobs = scheduler.spawn(cancel.clone());

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping reminder checks..."),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }

    cancel.cancel();
    for job in jobs {
        if let Err(e) = job.await {
            error!("Reminder job ended abnormally: {e}");
        }
    }

    info!("Consultation platform stopped");
}

fn build_reminder_scheduler(app_state: &AppState) -> ReminderScheduler {
    let config = &app_state.config;
    let db = &app_state.database_connection;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let publisher = EventPublisher::new()
        .with_handler(Arc::new(NotificationRecorder::new(Arc::clone(db))));

    let dispatcher = ReminderDispatcher::new(
        Arc::new(DatabaseBookingStore::new(Arc::clone(db))),
        Arc::new(DatabaseUserDirectory::new(
            Arc::clone(db),
            config.user_cache_ttl(),
            config.user_cache_capacity,
            Arc::clone(&clock),
        )),
        Arc::new(EventNotificationSink::new(publisher)),
    );
    let dispatcher = if config.reminder_dedup {
        info!("Reminder deduplication enabled");
        dispatcher.with_dedup()
    } else {
        dispatcher
    };

    ReminderScheduler::from_config(config, Arc::new(dispatcher), clock)
}

/// Scoring needs AssemblyAI; warn at startup rather than on the first recording.
async fn check_transcription_provider(config: &Config) {
    if config.assembly_ai_api_key().is_none() {
        warn!("ASSEMBLY_AI_API_KEY not set, consultation scoring is unavailable");
        return;
    }

    let provider = match AssemblyAiProvider::from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            warn!("Failed to build AssemblyAI client: {e}");
            return;
        }
    };

    match provider.verify_credentials().await {
        Ok(true) => info!("AssemblyAI credentials verified"),
        Ok(false) => warn!("AssemblyAI rejected the configured API key"),
        Err(e) => warn!("Could not reach AssemblyAI: {e}"),
    }
}
