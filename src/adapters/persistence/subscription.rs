use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billable_admin::SubscriptionRepo,
    domain::entities::subscription::{Subscription, SubscriptionSync},
};

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        billable_id: row.get("billable_id"),
        name: row.get("name"),
        plan: row.get("plan"),
        provider_subscription_id: row.get("provider_subscription_id"),
        quantity: row.get("quantity"),
        trial_ends_at: row.get("trial_ends_at"),
        ends_at: row.get("ends_at"),
        cycle_started_at: row.get("cycle_started_at"),
        cycle_ends_at: row.get("cycle_ends_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, billable_id, name, plan, provider_subscription_id, quantity,
    trial_ends_at, ends_at, cycle_started_at, cycle_ends_at,
    created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn find_by_name(&self, billable_id: i64, name: &str) -> AppResult<Option<Subscription>> {
        // Newest first when a billable re-subscribed under the same name.
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE billable_id = $1 AND name = $2 ORDER BY created_at DESC NULLS LAST, id DESC LIMIT 1",
            SELECT_COLS
        ))
        .bind(billable_id)
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn apply_sync(&self, id: i64, sync: &SubscriptionSync) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE subscriptions
            SET plan = COALESCE($2, plan),
                ends_at = $3,
                trial_ends_at = $4,
                cycle_started_at = $5,
                cycle_ends_at = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(&sync.plan)
        .bind(sync.ends_at)
        .bind(sync.trial_ends_at)
        .bind(sync.cycle_started_at)
        .bind(sync.cycle_ends_at)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }
}
