use chrono::{DateTime, Utc};

/// A locally stored subscription mirroring the provider's subscription.
///
/// The state predicates take `now` explicitly so callers evaluate every flag
/// against the same instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: i64,
    pub billable_id: i64,
    /// Subscription slot name, e.g. `default`.
    pub name: String,
    /// Name of the plan in the provider's catalog.
    pub plan: String,
    pub provider_subscription_id: String,
    pub quantity: i32,
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// Set once the subscription was cancelled; in the future while the
    /// remaining period is still being honoured.
    pub ends_at: Option<DateTime<Utc>>,
    pub cycle_started_at: Option<DateTime<Utc>>,
    pub cycle_ends_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn cancelled(&self) -> bool {
        self.ends_at.is_some()
    }

    pub fn on_grace_period(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|ends_at| ends_at > now)
    }

    pub fn on_trial(&self, now: DateTime<Utc>) -> bool {
        self.trial_ends_at.is_some_and(|trial_ends_at| trial_ends_at > now)
    }

    pub fn active(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_none() || self.on_trial(now) || self.on_grace_period(now)
    }

    pub fn ended(&self, now: DateTime<Utc>) -> bool {
        self.cancelled() && !self.on_grace_period(now)
    }
}

/// Provider-reported state written back after a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSync {
    /// `None` when the provider did not report a plan; the stored plan is kept.
    pub plan: Option<String>,
    pub ends_at: Option<DateTime<Utc>>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub cycle_started_at: Option<DateTime<Utc>>,
    pub cycle_ends_at: Option<DateTime<Utc>>,
}
