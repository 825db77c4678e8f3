use crate::{
    adapters::http::app_state::AppState,
    application::ports::billing_provider::BillingProviderPort,
    infra::{
        config::AppConfig, postgres_persistence, stripe_billing_adapter::StripeBillingAdapter,
        stripe_client::StripeClient,
    },
    use_cases::billable_admin::{BillableAdminUseCases, BillableRepo, SubscriptionRepo},
};
use secrecy::ExposeSecret;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let stripe_client = StripeClient::new(
        config.stripe_secret_key.expose_secret().to_string(),
        &config.stripe_api_base,
    );
    let provider_arc =
        Arc::new(StripeBillingAdapter::new(stripe_client)) as Arc<dyn BillingProviderPort>;

    let billable_repo_arc = postgres_arc.clone() as Arc<dyn BillableRepo>;
    let subscription_repo_arc = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;

    let billable_admin_use_cases = BillableAdminUseCases::new(
        billable_repo_arc,
        subscription_repo_arc,
        provider_arc,
        config.admin_settings(),
    );

    Ok(AppState {
        config: Arc::new(config),
        billable_admin_use_cases: Arc::new(billable_admin_use_cases),
    })
}

pub fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cashier_admin=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when a path is configured
    let json_layer = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true)
                .boxed(),
        ),
        Err(e) => {
            eprintln!("cannot create log file {}: {e}", path.display());
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
