use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProviderPort, Card, Charge, CustomerId, Invoice, ProviderSubscription, Refund,
        RefundRequest, SubscriptionId,
    },
    domain::entities::plan::{Plan, PlanInterval},
    infra::stripe_client::{
        StripeCharge, StripeClient, StripeInvoice, StripePaymentMethod, StripePlan, StripeRefund,
        StripeSubscription,
    },
};

/// Adapter that wraps StripeClient to implement BillingProviderPort.
#[derive(Clone)]
pub struct StripeBillingAdapter {
    client: StripeClient,
}

impl StripeBillingAdapter {
    pub fn new(client: StripeClient) -> Self {
        Self { client }
    }

    /// Plans with an interval we cannot represent are dropped.
    fn map_plan(plan: StripePlan) -> Option<Plan> {
        let interval = match plan.interval.parse::<PlanInterval>() {
            Ok(interval) => interval,
            Err(_) => {
                tracing::warn!(plan = %plan.id, interval = %plan.interval, "Skipping plan with unknown interval");
                return None;
            }
        };

        Some(Plan {
            name: plan.id,
            nickname: plan.nickname,
            amount: plan.amount.unwrap_or(0),
            interval,
            interval_count: plan.interval_count,
            currency: plan.currency,
        })
    }

    fn map_card(pm: StripePaymentMethod) -> Option<Card> {
        let card = pm.card?;
        Some(Card {
            id: pm.id,
            name: pm.billing_details.and_then(|d| d.name),
            last4: card.last4,
            country: card.country,
            brand: card.brand,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
        })
    }

    fn map_invoice(invoice: StripeInvoice) -> Invoice {
        Invoice {
            id: invoice.id,
            total: invoice.total,
            attempted: invoice.attempted,
            charge: invoice.charge,
            currency: invoice.currency,
            period_start: invoice.period_start,
            period_end: invoice.period_end,
        }
    }

    fn map_charge(charge: StripeCharge) -> Charge {
        Charge {
            id: charge.id,
            amount: charge.amount,
            amount_refunded: charge.amount_refunded,
            captured: charge.captured,
            paid: charge.paid,
            status: charge.status,
            currency: charge.currency,
            dispute: charge.dispute,
            failure_code: charge.failure_code,
            failure_message: charge.failure_message,
            created: charge.created,
        }
    }

    fn map_subscription(sub: StripeSubscription) -> ProviderSubscription {
        let plan = sub.plan_id();
        ProviderSubscription {
            id: SubscriptionId::new(sub.id),
            status: sub.status,
            plan,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
            canceled_at: sub.canceled_at,
            ended_at: sub.ended_at,
            trial_end: sub.trial_end,
        }
    }

    fn map_refund(refund: StripeRefund) -> Refund {
        Refund {
            id: refund.id,
            charge_id: refund.charge,
            amount: refund.amount,
            status: refund.status.unwrap_or_else(|| "pending".to_string()),
            created: refund.created,
        }
    }
}

#[async_trait]
impl BillingProviderPort for StripeBillingAdapter {
    #[tracing::instrument(skip(self))]
    async fn list_plans(&self, limit: u32) -> AppResult<Vec<Plan>> {
        let plans = self.client.list_plans(limit).await?;
        Ok(plans.into_iter().filter_map(Self::map_plan).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn find_plan(&self, name: &str) -> AppResult<Option<Plan>> {
        let plan = self.client.get_plan(name).await?;
        Ok(plan.and_then(Self::map_plan))
    }

    #[tracing::instrument(skip(self))]
    async fn list_cards(&self, customer: &CustomerId) -> AppResult<Vec<Card>> {
        let methods = self
            .client
            .list_card_payment_methods(customer.as_str())
            .await?;
        Ok(methods.into_iter().filter_map(Self::map_card).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn default_card_id(&self, customer: &CustomerId) -> AppResult<Option<String>> {
        let customer = self.client.get_customer(customer.as_str()).await?;
        Ok(customer.default_payment_method())
    }

    #[tracing::instrument(skip(self))]
    async fn list_invoices(&self, customer: &CustomerId, limit: u32) -> AppResult<Vec<Invoice>> {
        let invoices = self.client.list_invoices(customer.as_str(), limit).await?;
        Ok(invoices.into_iter().map(Self::map_invoice).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_charges(&self, customer: &CustomerId, limit: u32) -> AppResult<Vec<Charge>> {
        let charges = self.client.list_charges(customer.as_str(), limit).await?;
        Ok(charges.into_iter().map(Self::map_charge).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_subscription(
        &self,
        subscription_id: &SubscriptionId,
        at_period_end: bool,
    ) -> AppResult<ProviderSubscription> {
        let sub = self
            .client
            .cancel_subscription(subscription_id.as_str(), at_period_end)
            .await?;

        tracing::info!(
            subscription_id = %subscription_id,
            at_period_end,
            status = %sub.status,
            "Cancelled subscription"
        );

        Ok(Self::map_subscription(sub))
    }

    #[tracing::instrument(skip(self))]
    async fn resume_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<ProviderSubscription> {
        let sub = self
            .client
            .update_subscription(
                subscription_id.as_str(),
                &[("cancel_at_period_end".to_string(), "false".to_string())],
            )
            .await?;

        tracing::info!(subscription_id = %subscription_id, "Resumed subscription");

        Ok(Self::map_subscription(sub))
    }

    #[tracing::instrument(skip(self, plan), fields(plan = %plan.name))]
    async fn swap_plan(
        &self,
        subscription_id: &SubscriptionId,
        plan: &Plan,
    ) -> AppResult<ProviderSubscription> {
        let current = self
            .client
            .get_subscription(subscription_id.as_str())
            .await?;

        let item_id = current
            .first_item()
            .map(|item| item.id.clone())
            .ok_or_else(|| AppError::Provider("No subscription item found".to_string()))?;

        // Swapping also undoes a pending cancellation.
        let params = vec![
            ("items[0][id]".to_string(), item_id),
            ("items[0][plan]".to_string(), plan.name.clone()),
            ("cancel_at_period_end".to_string(), "false".to_string()),
        ];

        let sub = self
            .client
            .update_subscription(subscription_id.as_str(), &params)
            .await?;

        tracing::info!(
            subscription_id = %subscription_id,
            plan = %plan.name,
            "Swapped subscription plan"
        );

        Ok(Self::map_subscription(sub))
    }

    #[tracing::instrument(skip(self))]
    async fn create_refund(&self, request: &RefundRequest) -> AppResult<Refund> {
        let refund = self
            .client
            .create_refund(
                &request.charge_id,
                request.amount,
                request.notes.as_deref(),
            )
            .await?;

        tracing::info!(
            refund_id = %refund.id,
            charge_id = %request.charge_id,
            amount = refund.amount,
            "Created refund"
        );

        Ok(Self::map_refund(refund))
    }
}
