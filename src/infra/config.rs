use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{infra::stripe_client::STRIPE_API_BASE, use_cases::billable_admin::AdminSettings};

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub cors_origin: HeaderValue,
    /// Bearer token every `/api` request must carry.
    pub admin_api_token: SecretString,
    pub stripe_secret_key: SecretString,
    /// Overridable so tests and local setups can point at a Stripe mock.
    pub stripe_api_base: Url,
    /// Name of the subscription the admin panel manages for each billable.
    pub subscription_name: String,
    /// Label reported as `plan_currency`, independent of the plan's own currency.
    pub currency_label: String,
    pub plan_list_limit: u32,
    pub payment_details_enabled: bool,
    pub payment_history_limit: u32,
    /// Optional path for structured JSON logs.
    pub log_file: Option<PathBuf>,
}

/// Stripe list endpoints accept a `limit` between 1 and 100.
const STRIPE_LIST_LIMIT_MAX: u32 = 100;

fn stripe_list_limit(name: &str, value: u32) -> anyhow::Result<u32> {
    anyhow::ensure!(
        (1..=STRIPE_LIST_LIMIT_MAX).contains(&value),
        "{name} must be between 1 and {STRIPE_LIST_LIMIT_MAX}, got {value}"
    );
    Ok(value)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let database_url: String = get_env("DATABASE_URL");
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .context("CORS_ORIGIN must be a valid header value")?;

        let admin_api_token = SecretString::new(get_env::<String>("ADMIN_API_TOKEN").into());
        let stripe_secret_key = SecretString::new(get_env::<String>("STRIPE_SECRET_KEY").into());
        let stripe_api_base: Url = get_env_default(
            "STRIPE_API_BASE",
            Url::parse(STRIPE_API_BASE).context("default Stripe API base")?,
        );

        let subscription_name: String =
            get_env_default("SUBSCRIPTION_NAME", String::from("default"));
        let currency_label: String = get_env_default("PLAN_CURRENCY_LABEL", String::from("EUR"));
        let plan_list_limit =
            stripe_list_limit("PLAN_LIST_LIMIT", get_env_default("PLAN_LIST_LIMIT", 100))?;
        let payment_details_enabled: bool = get_env_default("PAYMENT_DETAILS_ENABLED", true);
        let payment_history_limit = stripe_list_limit(
            "PAYMENT_HISTORY_LIMIT",
            get_env_default("PAYMENT_HISTORY_LIMIT", 25),
        )?;
        let log_file: Option<PathBuf> = std::env::var("LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            database_url,
            cors_origin,
            admin_api_token,
            stripe_secret_key,
            stripe_api_base,
            subscription_name,
            currency_label,
            plan_list_limit,
            payment_details_enabled,
            payment_history_limit,
            log_file,
        })
    }

    pub fn admin_settings(&self) -> AdminSettings {
        AdminSettings {
            subscription_name: self.subscription_name.clone(),
            currency_label: self.currency_label.clone(),
            plan_list_limit: self.plan_list_limit,
            payment_details_enabled: self.payment_details_enabled,
            payment_history_limit: self.payment_history_limit,
        }
    }
}
