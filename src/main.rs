use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallybox::{
    api,
    config::Settings,
    ledger::CsvLedger,
    mail::SmtpMailer,
    notify::NotificationDispatcher,
    payments::StripeGateway,
    reconcile::SettlementReconciler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallybox=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    let secret_key = settings
        .stripe
        .secret_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Missing required configuration: stripe.secret_key"))?;
    let location_id = settings
        .stripe
        .location_id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Missing required configuration: stripe.location_id"))?;

    tracing::info!(
        "Starting Tallybox POS on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let gateway = Arc::new(StripeGateway::new(secret_key, location_id));
    let mailer = Arc::new(SmtpMailer::new(settings.email.clone()));
    let dispatcher = NotificationDispatcher::new(
        mailer,
        settings.organization.clone(),
        settings.email.notification_email.clone(),
    );
    let ledger = Arc::new(CsvLedger::new(settings.audit.log_dir.clone()));
    let reconciler = Arc::new(SettlementReconciler::new(
        gateway.clone(),
        dispatcher,
        ledger,
    ));

    let settings = Arc::new(settings);
    let app = api::create_app(gateway, reconciler, settings.clone());

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
