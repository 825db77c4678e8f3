use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::app_error::{AppError, AppResult};

pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: Url,
}

impl StripeClient {
    pub fn new(secret_key: String, api_base: &Url) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_base: api_base.clone(),
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.secret_key));
        format!("Basic {}", encoded)
    }

    /// Endpoint under the API base. Each segment is percent-encoded, so ids
    /// cannot add path segments, a query or a fragment.
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Internal(format!("Invalid Stripe API base: {}", self.api_base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ========================================================================
    // Plans
    // ========================================================================

    pub async fn list_plans(&self, limit: u32) -> AppResult<Vec<StripePlan>> {
        let response = self
            .client
            .get(self.url(&["plans"])?)
            .header("Authorization", self.auth_header())
            .query(&[("limit", limit.to_string()), ("active", "true".to_string())])
            .send()
            .await
            .map_err(request_failed)?;

        let list: StripeList<StripePlan> = self.handle_response(response).await?;
        Ok(list.data)
    }

    pub async fn get_plan(&self, plan_id: &str) -> AppResult<Option<StripePlan>> {
        let response = self
            .client
            .get(self.url(&["plans", plan_id])?)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(request_failed)?;

        self.handle_optional_response(response).await
    }

    // ========================================================================
    // Customers & Payment Methods
    // ========================================================================

    pub async fn get_customer(&self, customer_id: &str) -> AppResult<StripeCustomer> {
        let response = self
            .client
            .get(self.url(&["customers", customer_id])?)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(request_failed)?;

        self.handle_response(response).await
    }

    pub async fn list_card_payment_methods(
        &self,
        customer_id: &str,
    ) -> AppResult<Vec<StripePaymentMethod>> {
        let response = self
            .client
            .get(self.url(&["payment_methods"])?)
            .header("Authorization", self.auth_header())
            .query(&[("customer", customer_id), ("type", "card")])
            .send()
            .await
            .map_err(request_failed)?;

        let list: StripeList<StripePaymentMethod> = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Invoices & Charges
    // ========================================================================

    pub async fn list_invoices(&self, customer_id: &str, limit: u32) -> AppResult<Vec<StripeInvoice>> {
        let response = self
            .client
            .get(self.url(&["invoices"])?)
            .header("Authorization", self.auth_header())
            .query(&[("customer", customer_id.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(request_failed)?;

        let list: StripeList<StripeInvoice> = self.handle_response(response).await?;
        Ok(list.data)
    }

    pub async fn list_charges(&self, customer_id: &str, limit: u32) -> AppResult<Vec<StripeCharge>> {
        let response = self
            .client
            .get(self.url(&["charges"])?)
            .header("Authorization", self.auth_header())
            .query(&[("customer", customer_id.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(request_failed)?;

        let list: StripeList<StripeCharge> = self.handle_response(response).await?;
        Ok(list.data)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub async fn get_subscription(&self, subscription_id: &str) -> AppResult<StripeSubscription> {
        let response = self
            .client
            .get(self.url(&["subscriptions", subscription_id])?)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(request_failed)?;

        self.handle_response(response).await
    }

    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        params: &[(String, String)],
    ) -> AppResult<StripeSubscription> {
        let response = self
            .client
            .post(self.url(&["subscriptions", subscription_id])?)
            .header("Authorization", self.auth_header())
            .form(params)
            .send()
            .await
            .map_err(request_failed)?;

        self.handle_response(response).await
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> AppResult<StripeSubscription> {
        if at_period_end {
            self.update_subscription(
                subscription_id,
                &[("cancel_at_period_end".to_string(), "true".to_string())],
            )
            .await
        } else {
            let response = self
                .client
                .delete(self.url(&["subscriptions", subscription_id])?)
                .header("Authorization", self.auth_header())
                .send()
                .await
                .map_err(request_failed)?;

            self.handle_response(response).await
        }
    }

    // ========================================================================
    // Refunds
    // ========================================================================

    pub async fn create_refund(
        &self,
        charge_id: &str,
        amount: Option<i64>,
        notes: Option<&str>,
    ) -> AppResult<StripeRefund> {
        let mut params: Vec<(String, String)> = vec![("charge".to_string(), charge_id.to_string())];

        if let Some(amt) = amount {
            params.push(("amount".to_string(), amt.to_string()));
        }

        if let Some(n) = notes {
            params.push(("metadata[notes]".to_string(), n.to_string()));
        }

        let response = self
            .client
            .post(self.url(&["refunds"])?)
            .header("Authorization", self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(request_failed)?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_optional_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<Option<T>> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            if let Ok(error) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::Provider(format!(
                    "Stripe error: {}",
                    error.error.message.unwrap_or(error.error.error_type)
                )));
            }

            return Err(AppError::Provider(format!(
                "Stripe API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

fn request_failed(e: reqwest::Error) -> AppError {
    AppError::Provider(format!("Stripe request failed: {}", e))
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct StripePlan {
    pub id: String,
    pub nickname: Option<String>,
    pub amount: Option<i64>,
    pub currency: String,
    pub interval: String,
    #[serde(default = "one")]
    pub interval_count: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    pub default_source: Option<String>,
    pub invoice_settings: Option<StripeInvoiceSettings>,
}

impl StripeCustomer {
    /// Default payment method, falling back to the legacy default source.
    pub fn default_payment_method(&self) -> Option<String> {
        self.invoice_settings
            .as_ref()
            .and_then(|s| s.default_payment_method.clone())
            .or_else(|| self.default_source.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceSettings {
    pub default_payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentMethod {
    pub id: String,
    pub billing_details: Option<StripeBillingDetails>,
    pub card: Option<StripeCard>,
}

#[derive(Debug, Deserialize)]
pub struct StripeBillingDetails {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoice {
    pub id: String,
    pub total: i64,
    #[serde(default)]
    pub attempted: bool,
    pub charge: Option<String>,
    pub currency: String,
    pub period_start: Option<i64>,
    pub period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCharge {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub paid: bool,
    pub status: String,
    pub currency: String,
    pub dispute: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub created: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub trial_end: Option<i64>,
    pub items: StripeList<StripeSubscriptionItem>,
}

impl StripeSubscription {
    pub fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    /// Plan id of the first subscription item.
    pub fn plan_id(&self) -> Option<String> {
        self.first_item()
            .and_then(|item| item.plan.as_ref().map(|p| p.id.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItem {
    pub id: String,
    pub plan: Option<StripeItemPlan>,
}

#[derive(Debug, Deserialize)]
pub struct StripeItemPlan {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    pub amount: i64,
    pub charge: Option<String>,
    pub status: Option<String>,
    pub created: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
}
