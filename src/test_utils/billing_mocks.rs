//! In-memory implementations of the billing ports.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::billing_provider::{
            BillingProviderPort, Card, Charge, CustomerId, Invoice, ProviderSubscription, Refund,
            RefundRequest, SubscriptionId,
        },
        use_cases::billable_admin::{BillableRepo, SubscriptionRepo},
    },
    domain::entities::{
        billable::Billable,
        plan::Plan,
        subscription::{Subscription, SubscriptionSync},
    },
};

/// Plan the mock provider reports for subscriptions it has not swapped.
pub const DEFAULT_TEST_PLAN: &str = "pro";

const PERIOD_SECS: i64 = 30 * 24 * 60 * 60;

// ============================================================================
// InMemoryBillableRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryBillableRepo {
    pub billables: Mutex<HashMap<i64, Billable>>,
}

impl InMemoryBillableRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_billables(billables: Vec<Billable>) -> Self {
        Self {
            billables: Mutex::new(billables.into_iter().map(|b| (b.id, b)).collect()),
        }
    }
}

#[async_trait]
impl BillableRepo for InMemoryBillableRepo {
    async fn find(&self, id: i64) -> AppResult<Option<Billable>> {
        Ok(self.billables.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<i64, Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions.into_iter().map(|s| (s.id, s)).collect()),
        }
    }

    pub fn get(&self, id: i64) -> Option<Subscription> {
        self.subscriptions.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn find_by_name(&self, billable_id: i64, name: &str) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.billable_id == billable_id && s.name == name)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn apply_sync(&self, id: i64, sync: &SubscriptionSync) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(plan) = &sync.plan {
            subscription.plan = plan.clone();
        }
        subscription.ends_at = sync.ends_at;
        subscription.trial_ends_at = sync.trial_ends_at;
        subscription.cycle_started_at = sync.cycle_started_at;
        subscription.cycle_ends_at = sync.cycle_ends_at;
        subscription.updated_at = Some(Utc::now());
        Ok(subscription.clone())
    }
}

// ============================================================================
// MockBillingProvider
// ============================================================================

/// Provider double that answers from fixed data and records every mutation.
#[derive(Default)]
pub struct MockBillingProvider {
    plans: Vec<Plan>,
    cards: Vec<Card>,
    default_card: Option<String>,
    invoices: Vec<Invoice>,
    charges: Vec<Charge>,
    failing: bool,
    subscription_plans: Mutex<HashMap<String, String>>,
    cancel_calls: Mutex<Vec<(String, bool)>>,
    resume_calls: Mutex<Vec<String>>,
    swap_calls: Mutex<Vec<(String, String)>>,
    refund_requests: Mutex<Vec<RefundRequest>>,
}

impl MockBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(mut self, plans: Vec<Plan>) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>, default_card: Option<&str>) -> Self {
        self.cards = cards;
        self.default_card = default_card.map(str::to_string);
        self
    }

    pub fn with_invoices(mut self, invoices: Vec<Invoice>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn with_charges(mut self, charges: Vec<Charge>) -> Self {
        self.charges = charges;
        self
    }

    /// Make every call fail like an unreachable provider.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn cancel_calls(&self) -> Vec<(String, bool)> {
        self.cancel_calls.lock().unwrap().clone()
    }

    pub fn resume_calls(&self) -> Vec<String> {
        self.resume_calls.lock().unwrap().clone()
    }

    pub fn swap_calls(&self) -> Vec<(String, String)> {
        self.swap_calls.lock().unwrap().clone()
    }

    pub fn refund_requests(&self) -> Vec<RefundRequest> {
        self.refund_requests.lock().unwrap().clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Provider("simulated provider outage".into()));
        }
        Ok(())
    }

    fn snapshot(&self, id: &SubscriptionId) -> ProviderSubscription {
        let now = Utc::now().timestamp();
        let plan = self
            .subscription_plans
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .unwrap_or_else(|| DEFAULT_TEST_PLAN.to_string());

        ProviderSubscription {
            id: id.clone(),
            status: "active".to_string(),
            plan: Some(plan),
            current_period_start: Some(now),
            current_period_end: Some(now + PERIOD_SECS),
            cancel_at_period_end: false,
            canceled_at: None,
            ended_at: None,
            trial_end: None,
        }
    }
}

#[async_trait]
impl BillingProviderPort for MockBillingProvider {
    async fn list_plans(&self, limit: u32) -> AppResult<Vec<Plan>> {
        self.check()?;
        Ok(self.plans.iter().take(limit as usize).cloned().collect())
    }

    async fn find_plan(&self, name: &str) -> AppResult<Option<Plan>> {
        self.check()?;
        Ok(self.plans.iter().find(|p| p.name == name).cloned())
    }

    async fn list_cards(&self, _customer: &CustomerId) -> AppResult<Vec<Card>> {
        self.check()?;
        Ok(self.cards.clone())
    }

    async fn default_card_id(&self, _customer: &CustomerId) -> AppResult<Option<String>> {
        self.check()?;
        Ok(self.default_card.clone())
    }

    async fn list_invoices(&self, _customer: &CustomerId, limit: u32) -> AppResult<Vec<Invoice>> {
        self.check()?;
        Ok(self.invoices.iter().take(limit as usize).cloned().collect())
    }

    async fn list_charges(&self, _customer: &CustomerId, limit: u32) -> AppResult<Vec<Charge>> {
        self.check()?;
        Ok(self.charges.iter().take(limit as usize).cloned().collect())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &SubscriptionId,
        at_period_end: bool,
    ) -> AppResult<ProviderSubscription> {
        self.check()?;
        self.cancel_calls
            .lock()
            .unwrap()
            .push((subscription_id.to_string(), at_period_end));

        let mut snapshot = self.snapshot(subscription_id);
        if at_period_end {
            snapshot.cancel_at_period_end = true;
        } else {
            let now = Utc::now().timestamp();
            snapshot.status = "canceled".to_string();
            snapshot.canceled_at = Some(now);
            snapshot.ended_at = Some(now);
        }
        Ok(snapshot)
    }

    async fn resume_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<ProviderSubscription> {
        self.check()?;
        self.resume_calls
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(self.snapshot(subscription_id))
    }

    async fn swap_plan(
        &self,
        subscription_id: &SubscriptionId,
        plan: &Plan,
    ) -> AppResult<ProviderSubscription> {
        self.check()?;
        self.swap_calls
            .lock()
            .unwrap()
            .push((subscription_id.to_string(), plan.name.clone()));
        self.subscription_plans
            .lock()
            .unwrap()
            .insert(subscription_id.to_string(), plan.name.clone());
        Ok(self.snapshot(subscription_id))
    }

    async fn create_refund(&self, request: &RefundRequest) -> AppResult<Refund> {
        self.check()?;
        self.refund_requests.lock().unwrap().push(request.clone());

        let amount = request.amount.unwrap_or_else(|| {
            self.charges
                .iter()
                .find(|c| c.id == request.charge_id)
                .map(|c| c.amount - c.amount_refunded)
                .unwrap_or_default()
        });

        Ok(Refund {
            id: format!("re_{}", request.charge_id),
            charge_id: Some(request.charge_id.clone()),
            amount,
            status: "succeeded".to_string(),
            created: Some(Utc::now().timestamp()),
        })
    }
}
