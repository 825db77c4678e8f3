//! Display records for the admin dashboard.
//!
//! Every function here is a pure mapping from a billing object to a flat,
//! serializable record. Records carry only primitives, strings and nested
//! records, so nothing provider-specific leaks into a response body.
//!
//! Date-times render as UTC `YYYY-MM-DD HH:MM:SS`, dates as `YYYY-MM-DD`.
//! Absent timestamps (and epoch `0`) render as `null`.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    application::ports::billing_provider::{Card, Charge, Invoice, Refund, epoch_to_utc},
    domain::entities::{billable::Billable, plan::Plan, subscription::Subscription},
};

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub billable_id: i64,
    pub name: String,
    pub provider_subscription_id: String,
    pub quantity: i32,
    pub trial_ends_at: Option<String>,
    pub ends_at: Option<String>,
    pub updated_at: Option<String>,
    pub plan: String,
    pub plan_amount: Option<i64>,
    pub plan_interval: Option<String>,
    pub plan_currency: String,
    pub ended: bool,
    pub cancelled: bool,
    pub active: bool,
    pub on_trial: bool,
    pub on_grace_period: bool,
    pub created_at: Option<String>,
    pub ended_at: Option<String>,
    pub current_period_start: Option<String>,
    pub current_period_end: Option<String>,
    pub days_until_due: Option<i64>,
    /// Mirrors `ends_at`; truthy while a cancellation is pending or done.
    pub cancel_at_period_end: Option<String>,
    pub canceled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    pub id: String,
    pub is_default: bool,
    pub name: Option<String>,
    pub last4: String,
    pub country: Option<String>,
    pub brand: String,
    pub exp_month: i32,
    pub exp_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub total: i64,
    pub attempted: bool,
    pub charge_id: Option<String>,
    pub currency: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRecord {
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
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRecord {
    pub name: String,
    pub amount: i64,
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRecord {
    pub id: String,
    pub charge_id: Option<String>,
    pub amount: i64,
    pub status: String,
    pub created: Option<String>,
}

/// Full admin view of a subscribed billable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribedOverview {
    pub user: Billable,
    pub cards: Vec<CardRecord>,
    pub invoices: Vec<InvoiceRecord>,
    pub charges: Vec<ChargeRecord>,
    pub subscription: SubscriptionRecord,
    pub plans: Vec<PlanRecord>,
}

/// Response body of the billable lookup.
///
/// A billable without a subscription serializes to exactly
/// `{"subscription": null}`.
#[derive(Debug, Clone, PartialEq)]
pub enum BillableOverview {
    Unsubscribed,
    Subscribed(Box<SubscribedOverview>),
}

impl Serialize for BillableOverview {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BillableOverview::Unsubscribed => {
                let mut state = serializer.serialize_struct("BillableOverview", 1)?;
                state.serialize_field("subscription", &Option::<SubscriptionRecord>::None)?;
                state.end()
            }
            BillableOverview::Subscribed(overview) => overview.serialize(serializer),
        }
    }
}

// ============================================================================
// Formatters
// ============================================================================

/// Flatten a subscription together with its resolved catalog plan.
///
/// `plan` is `None` when the subscription's plan is no longer in the catalog;
/// the plan-derived fields are then `null`.
pub fn format_subscription(
    subscription: &Subscription,
    plan: Option<&Plan>,
    currency_label: &str,
    now: DateTime<Utc>,
) -> SubscriptionRecord {
    let ends_at = date_time_string(subscription.ends_at);

    SubscriptionRecord {
        id: subscription.id,
        billable_id: subscription.billable_id,
        name: subscription.name.clone(),
        provider_subscription_id: subscription.provider_subscription_id.clone(),
        quantity: subscription.quantity,
        trial_ends_at: date_time_string(subscription.trial_ends_at),
        ends_at: ends_at.clone(),
        updated_at: date_time_string(subscription.updated_at),
        plan: subscription.plan.clone(),
        plan_amount: plan.map(Plan::amount),
        plan_interval: plan.map(|p| p.interval().to_string()),
        plan_currency: currency_label.to_string(),
        ended: subscription.ended(now),
        cancelled: subscription.cancelled(),
        active: subscription.active(now),
        on_trial: subscription.on_trial(now),
        on_grace_period: subscription.on_grace_period(now),
        created_at: date_time_string(subscription.created_at),
        ended_at: None,
        current_period_start: date_string(subscription.cycle_started_at),
        current_period_end: date_string(subscription.cycle_ends_at),
        days_until_due: None,
        cancel_at_period_end: ends_at.clone(),
        canceled_at: ends_at,
    }
}

pub fn format_card(card: &Card, default_card_id: Option<&str>) -> CardRecord {
    CardRecord {
        id: card.id.clone(),
        is_default: default_card_id == Some(card.id.as_str()),
        name: card.name.clone(),
        last4: card.last4.clone(),
        country: card.country.clone(),
        brand: card.brand.clone(),
        exp_month: card.exp_month,
        exp_year: card.exp_year,
    }
}

pub fn format_cards(cards: &[Card], default_card_id: Option<&str>) -> Vec<CardRecord> {
    cards
        .iter()
        .map(|card| format_card(card, default_card_id))
        .collect()
}

pub fn format_invoice(invoice: &Invoice) -> InvoiceRecord {
    InvoiceRecord {
        id: invoice.id.clone(),
        total: invoice.total,
        attempted: invoice.attempted,
        charge_id: invoice.charge.clone(),
        currency: invoice.currency.clone(),
        period_start: epoch_to_date_time_string(invoice.period_start),
        period_end: epoch_to_date_time_string(invoice.period_end),
    }
}

pub fn format_invoices(invoices: &[Invoice]) -> Vec<InvoiceRecord> {
    invoices.iter().map(format_invoice).collect()
}

pub fn format_charge(charge: &Charge) -> ChargeRecord {
    ChargeRecord {
        id: charge.id.clone(),
        amount: charge.amount,
        amount_refunded: charge.amount_refunded,
        captured: charge.captured,
        paid: charge.paid,
        status: charge.status.clone(),
        currency: charge.currency.clone(),
        dispute: charge.dispute.clone(),
        failure_code: charge.failure_code.clone(),
        failure_message: charge.failure_message.clone(),
        created: epoch_to_date_time_string(charge.created),
    }
}

pub fn format_charges(charges: &[Charge]) -> Vec<ChargeRecord> {
    charges.iter().map(format_charge).collect()
}

pub fn format_plan(plan: &Plan) -> PlanRecord {
    PlanRecord {
        name: plan.name().to_string(),
        amount: plan.amount(),
        interval: plan.interval().to_string(),
    }
}

pub fn format_plans(plans: &[Plan]) -> Vec<PlanRecord> {
    plans.iter().map(format_plan).collect()
}

pub fn format_refund(refund: &Refund) -> RefundRecord {
    RefundRecord {
        id: refund.id.clone(),
        charge_id: refund.charge_id.clone(),
        amount: refund.amount,
        status: refund.status.clone(),
        created: epoch_to_date_time_string(refund.created),
    }
}

// ============================================================================
// Date helpers
// ============================================================================

pub fn date_time_string(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|v| v.format(DATE_TIME_FORMAT).to_string())
}

pub fn date_string(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|v| v.format(DATE_FORMAT).to_string())
}

/// Epoch seconds to a date-time string; `0` and absent map to `None`.
pub fn epoch_to_date_time_string(ts: Option<i64>) -> Option<String> {
    date_time_string(epoch_to_utc(ts))
}
