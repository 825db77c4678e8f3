//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory mocks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::billing_provider::BillingProviderPort,
        use_cases::billable_admin::{AdminSettings, BillableAdminUseCases, SubscriptionRepo},
    },
    domain::entities::{billable::Billable, subscription::Subscription},
    infra::{config::AppConfig, stripe_client::STRIPE_API_BASE},
    test_utils::{InMemoryBillableRepo, InMemorySubscriptionRepo, MockBillingProvider},
};

/// Bearer token accepted by apps built from `TestAppStateBuilder`.
pub const TEST_ADMIN_TOKEN: &str = "test_admin_token";

/// Builder for creating test AppState with configurable mocks.
#[derive(Default)]
pub struct TestAppStateBuilder {
    billables: Vec<Billable>,
    subscriptions: Vec<Subscription>,
    subscription_repo: Option<Arc<InMemorySubscriptionRepo>>,
    provider: Option<Arc<dyn BillingProviderPort>>,
    settings: AdminSettings,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_billable(mut self, billable: Billable) -> Self {
        self.billables.push(billable);
        self
    }

    /// Seed the default in-memory subscription repo.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Use a shared subscription repo so the test can inspect stored rows.
    pub fn with_subscription_repo(mut self, repo: Arc<InMemorySubscriptionRepo>) -> Self {
        self.subscription_repo = Some(repo);
        self
    }

    pub fn with_provider(self, provider: MockBillingProvider) -> Self {
        self.with_provider_arc(Arc::new(provider))
    }

    /// Use a shared provider so the test can inspect recorded calls.
    pub fn with_provider_arc(mut self, provider: Arc<dyn BillingProviderPort>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_settings(mut self, settings: AdminSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let billable_repo = Arc::new(InMemoryBillableRepo::with_billables(self.billables));
        let subscription_repo: Arc<dyn SubscriptionRepo> = match self.subscription_repo {
            Some(repo) => repo,
            None => Arc::new(InMemorySubscriptionRepo::with_subscriptions(
                self.subscriptions,
            )),
        };
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(MockBillingProvider::new()));

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            admin_api_token: SecretString::new(TEST_ADMIN_TOKEN.into()),
            stripe_secret_key: SecretString::new("sk_test_123".into()),
            stripe_api_base: Url::parse(STRIPE_API_BASE).unwrap(),
            subscription_name: self.settings.subscription_name.clone(),
            currency_label: self.settings.currency_label.clone(),
            plan_list_limit: self.settings.plan_list_limit,
            payment_details_enabled: self.settings.payment_details_enabled,
            payment_history_limit: self.settings.payment_history_limit,
            log_file: None,
        });

        let billable_admin_use_cases = Arc::new(BillableAdminUseCases::new(
            billable_repo,
            subscription_repo,
            provider,
            self.settings,
        ));

        AppState {
            config,
            billable_admin_use_cases,
        }
    }
}
