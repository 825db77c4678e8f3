//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    application::ports::billing_provider::{Card, Charge, Invoice},
    domain::entities::{
        billable::Billable,
        plan::{Plan, PlanInterval},
        subscription::Subscription,
    },
};

/// Create a test billable with sensible defaults.
pub fn create_test_billable(overrides: impl FnOnce(&mut Billable)) -> Billable {
    let mut billable = Billable {
        id: 1,
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        provider_customer_id: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut billable);
    billable
}

/// Create a running subscription for `billable_id` on the default test plan.
pub fn create_test_subscription(
    billable_id: i64,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let now = Utc::now();

    let mut subscription = Subscription {
        id: 1,
        billable_id,
        name: "default".to_string(),
        plan: "pro".to_string(),
        provider_subscription_id: "sub_test".to_string(),
        quantity: 1,
        trial_ends_at: None,
        ends_at: None,
        cycle_started_at: Some(now - Duration::days(5)),
        cycle_ends_at: Some(now + Duration::days(25)),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut subscription);
    subscription
}

/// Create a test plan with sensible defaults.
pub fn create_test_plan(overrides: impl FnOnce(&mut Plan)) -> Plan {
    let mut plan = Plan::new("pro", 2000, PlanInterval::Month);
    overrides(&mut plan);
    plan
}

pub fn create_test_card(overrides: impl FnOnce(&mut Card)) -> Card {
    let mut card = Card {
        id: "card_test".to_string(),
        name: Some("Ada Lovelace".to_string()),
        last4: "4242".to_string(),
        country: Some("GB".to_string()),
        brand: "visa".to_string(),
        exp_month: 12,
        exp_year: 2030,
    };
    overrides(&mut card);
    card
}

pub fn create_test_invoice(overrides: impl FnOnce(&mut Invoice)) -> Invoice {
    let mut invoice = Invoice {
        id: "in_test".to_string(),
        total: 2000,
        attempted: true,
        charge: Some("ch_test".to_string()),
        currency: "eur".to_string(),
        period_start: Some(test_datetime().timestamp()),
        period_end: Some((test_datetime() + Duration::days(30)).timestamp()),
    };
    overrides(&mut invoice);
    invoice
}

pub fn create_test_charge(overrides: impl FnOnce(&mut Charge)) -> Charge {
    let mut charge = Charge {
        id: "ch_test".to_string(),
        amount: 2000,
        amount_refunded: 0,
        captured: true,
        paid: true,
        status: "succeeded".to_string(),
        currency: "eur".to_string(),
        dispute: None,
        failure_code: None,
        failure_message: None,
        created: Some(test_datetime().timestamp()),
    };
    overrides(&mut charge);
    charge
}

/// Fixed timestamp for deterministic fixtures.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}
