use chrono::{DateTime, Utc};
use serde::Serialize;

/// An account that can hold subscriptions (a row of the `users` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Billable {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Customer id at the billing provider, set once the account has paid.
    pub provider_customer_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Billable {
    pub fn customer_id(&self) -> Option<&str> {
        self.provider_customer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
