use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{plan::Plan, subscription::SubscriptionSync},
};

// ============================================================================
// Port Types - records as the billing provider reports them
// ============================================================================

/// Unique identifier for a customer in the billing provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a subscription in the billing provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored card payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub name: Option<String>,
    pub last4: String,
    pub country: Option<String>,
    pub brand: String,
    pub exp_month: i32,
    pub exp_year: i32,
}

/// Invoice as reported by the provider. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub total: i64,
    pub attempted: bool,
    pub charge: Option<String>,
    pub currency: String,
    pub period_start: Option<i64>,
    pub period_end: Option<i64>,
}

/// Charge as reported by the provider. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub amount_refunded: i64,
    pub captured: bool,
    pub paid: bool,
    pub status: String,
    pub currency: String,
    pub dispute: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub created: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub charge_id: String,
    /// Partial amount in minor units; the full charge is refunded when absent.
    pub amount: Option<i64>,
    pub notes: Option<String>,
}

impl RefundRequest {
    /// Build a request, dropping a zero amount (full refund) and blank notes.
    ///
    /// Negative amounts are rejected.
    pub fn new(
        charge_id: impl Into<String>,
        amount: Option<i64>,
        notes: Option<String>,
    ) -> AppResult<Self> {
        if let Some(amount) = amount.filter(|a| *a < 0) {
            return Err(AppError::InvalidInput(format!(
                "Refund amount must not be negative, got {amount}"
            )));
        }

        Ok(Self {
            charge_id: charge_id.into(),
            amount: amount.filter(|a| *a != 0),
            notes: notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub id: String,
    pub charge_id: Option<String>,
    pub amount: i64,
    pub status: String,
    pub created: Option<i64>,
}

/// Subscription state returned by the provider after a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSubscription {
    pub id: SubscriptionId,
    pub status: String,
    /// Plan of the first subscription item, when the provider reports one.
    pub plan: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub trial_end: Option<i64>,
}

impl ProviderSubscription {
    /// Local fields to persist for this provider state.
    ///
    /// A subscription cancelled at period end keeps running until the trial
    /// or current period ends; one cancelled immediately ends when the
    /// provider stopped it.
    pub fn to_sync(&self) -> SubscriptionSync {
        let trial_ends_at = epoch_to_utc(self.trial_end);
        let cycle_ends_at = epoch_to_utc(self.current_period_end);

        let ends_at = if self.cancel_at_period_end {
            if self.status == "trialing" {
                trial_ends_at.or(cycle_ends_at)
            } else {
                cycle_ends_at
            }
        } else if self.status == "canceled" {
            epoch_to_utc(self.ended_at).or_else(|| epoch_to_utc(self.canceled_at))
        } else {
            None
        };

        SubscriptionSync {
            plan: self
                .plan
                .as_ref()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            ends_at,
            trial_ends_at,
            cycle_started_at: epoch_to_utc(self.current_period_start),
            cycle_ends_at,
        }
    }
}

/// Convert provider epoch seconds; zero counts as unset.
pub fn epoch_to_utc(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.filter(|ts| *ts > 0)
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

// ============================================================================
// Billing Provider Port
// ============================================================================

/// Billing provider port - the external subscription-billing service.
///
/// Every lifecycle rule (proration, cancellation timing, refund processing)
/// lives behind this trait; callers only forward requests and persist the
/// returned state.
#[async_trait]
pub trait BillingProviderPort: Send + Sync {
    // ========================================================================
    // Plan Catalog
    // ========================================================================

    /// List catalog plans, at most `limit` of them, in provider order.
    async fn list_plans(&self, limit: u32) -> AppResult<Vec<Plan>>;

    /// Look up a single plan by name. `None` when the provider does not know it.
    async fn find_plan(&self, name: &str) -> AppResult<Option<Plan>>;

    // ========================================================================
    // Payment History
    // ========================================================================

    async fn list_cards(&self, customer: &CustomerId) -> AppResult<Vec<Card>>;

    /// Id of the customer's default payment method, if any.
    async fn default_card_id(&self, customer: &CustomerId) -> AppResult<Option<String>>;

    async fn list_invoices(&self, customer: &CustomerId, limit: u32) -> AppResult<Vec<Invoice>>;

    async fn list_charges(&self, customer: &CustomerId, limit: u32) -> AppResult<Vec<Charge>>;

    // ========================================================================
    // Subscription Lifecycle
    // ========================================================================

    /// Cancel at the end of the current period, or immediately when
    /// `at_period_end` is false.
    async fn cancel_subscription(
        &self,
        subscription_id: &SubscriptionId,
        at_period_end: bool,
    ) -> AppResult<ProviderSubscription>;

    /// Undo a pending cancellation.
    async fn resume_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<ProviderSubscription>;

    /// Move the subscription onto another catalog plan.
    async fn swap_plan(
        &self,
        subscription_id: &SubscriptionId,
        plan: &Plan,
    ) -> AppResult<ProviderSubscription>;

    // ========================================================================
    // Refunds
    // ========================================================================

    async fn create_refund(&self, request: &RefundRequest) -> AppResult<Refund>;
}
