use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billable_admin::BillableRepo,
    domain::entities::billable::Billable,
};

fn row_to_billable(row: &sqlx::postgres::PgRow) -> Billable {
    Billable {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        provider_customer_id: row.get("provider_customer_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl BillableRepo for PostgresPersistence {
    async fn find(&self, id: i64) -> AppResult<Option<Billable>> {
        let row = sqlx::query(
            "SELECT id, name, email, provider_customer_id, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_billable))
    }
}
