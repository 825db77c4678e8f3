use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::billing_provider::{
            BillingProviderPort, CustomerId, ProviderSubscription, RefundRequest, SubscriptionId,
        },
        read_model::{
            BillableOverview, CardRecord, ChargeRecord, InvoiceRecord, RefundRecord,
            SubscribedOverview, format_cards, format_charges, format_invoices, format_plans,
            format_refund, format_subscription,
        },
    },
    domain::entities::{
        billable::Billable,
        subscription::{Subscription, SubscriptionSync},
    },
};

#[async_trait]
pub trait BillableRepo: Send + Sync {
    async fn find(&self, id: i64) -> AppResult<Option<Billable>>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn find_by_name(&self, billable_id: i64, name: &str) -> AppResult<Option<Subscription>>;

    /// Persist provider-reported state and return the updated row.
    async fn apply_sync(&self, id: i64, sync: &SubscriptionSync) -> AppResult<Subscription>;
}

/// Settings the admin use cases need, carved out of the app config.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    /// Subscription slot the dashboard manages.
    pub subscription_name: String,
    /// Label shown as `plan_currency` on subscription records.
    pub currency_label: String,
    pub plan_list_limit: u32,
    /// Whether cards, invoices and charges are fetched for the overview.
    pub payment_details_enabled: bool,
    pub payment_history_limit: u32,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            subscription_name: "default".to_string(),
            currency_label: "EUR".to_string(),
            plan_list_limit: 100,
            payment_details_enabled: true,
            payment_history_limit: 25,
        }
    }
}

#[derive(Clone)]
pub struct BillableAdminUseCases {
    billables: Arc<dyn BillableRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    provider: Arc<dyn BillingProviderPort>,
    settings: AdminSettings,
}

impl BillableAdminUseCases {
    pub fn new(
        billables: Arc<dyn BillableRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        provider: Arc<dyn BillingProviderPort>,
        settings: AdminSettings,
    ) -> Self {
        Self {
            billables,
            subscriptions,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    /// Everything the dashboard shows for one billable.
    ///
    /// `brief` skips the plan catalog and payment history.
    #[instrument(skip(self))]
    pub async fn overview(&self, billable_id: i64, brief: bool) -> AppResult<BillableOverview> {
        let billable = self.find_billable(billable_id).await?;

        let Some(subscription) = self
            .subscriptions
            .find_by_name(billable.id, &self.settings.subscription_name)
            .await?
        else {
            tracing::debug!(billable_id, "Billable has no subscription");
            return Ok(BillableOverview::Unsubscribed);
        };

        let plan = self.provider.find_plan(&subscription.plan).await?;
        if plan.is_none() {
            tracing::warn!(
                billable_id,
                plan = %subscription.plan,
                "Subscription plan missing from catalog"
            );
        }

        let record = format_subscription(
            &subscription,
            plan.as_ref(),
            &self.settings.currency_label,
            Utc::now(),
        );

        let plans = if brief {
            vec![]
        } else {
            format_plans(&self.provider.list_plans(self.settings.plan_list_limit).await?)
        };

        let (cards, invoices, charges) = match billable.customer_id() {
            Some(customer) if !brief && self.settings.payment_details_enabled => {
                self.payment_details(&CustomerId::new(customer)).await?
            }
            _ => (vec![], vec![], vec![]),
        };

        Ok(BillableOverview::Subscribed(Box::new(SubscribedOverview {
            user: billable,
            cards,
            invoices,
            charges,
            subscription: record,
            plans,
        })))
    }

    /// Cancel at period end, or right away when `now` is set.
    #[instrument(skip(self))]
    pub async fn cancel(&self, billable_id: i64, now: bool) -> AppResult<()> {
        let subscription = self.find_subscription(billable_id).await?;
        let updated = self
            .provider
            .cancel_subscription(&provider_id(&subscription), !now)
            .await?;
        self.sync(&subscription, updated).await?;

        tracing::info!(billable_id, immediately = now, "Subscription cancelled");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn swap(&self, billable_id: i64, plan: &str) -> AppResult<()> {
        let plan = plan.trim();
        if plan.is_empty() {
            return Err(AppError::InvalidInput("A plan is required".into()));
        }

        let subscription = self.find_subscription(billable_id).await?;
        let plan = self
            .provider
            .find_plan(plan)
            .await?
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown plan: {plan}")))?;

        let updated = self
            .provider
            .swap_plan(&provider_id(&subscription), &plan)
            .await?;
        self.sync(&subscription, updated).await?;

        tracing::info!(
            billable_id,
            from = %subscription.plan,
            to = %plan.name,
            "Subscription plan swapped"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn resume(&self, billable_id: i64) -> AppResult<()> {
        let subscription = self.find_subscription(billable_id).await?;
        if !subscription.on_grace_period(Utc::now()) {
            return Err(AppError::InvalidInput(
                "Unable to resume a subscription that is not within its grace period".into(),
            ));
        }

        let updated = self
            .provider
            .resume_subscription(&provider_id(&subscription))
            .await?;
        self.sync(&subscription, updated).await?;

        tracing::info!(billable_id, "Subscription resumed");
        Ok(())
    }

    /// Refund a charge, fully or partially. A zero amount means a full refund;
    /// a negative one is rejected before reaching the provider.
    #[instrument(skip(self, notes))]
    pub async fn refund(
        &self,
        billable_id: i64,
        charge_id: &str,
        amount: Option<i64>,
        notes: Option<String>,
    ) -> AppResult<RefundRecord> {
        self.find_billable(billable_id).await?;

        let request = RefundRequest::new(charge_id, amount, notes)?;
        let refund = self.provider.create_refund(&request).await?;

        tracing::info!(
            billable_id,
            charge_id,
            refund_id = %refund.id,
            amount = refund.amount,
            "Charge refunded"
        );
        Ok(format_refund(&refund))
    }

    async fn find_billable(&self, billable_id: i64) -> AppResult<Billable> {
        self.billables
            .find(billable_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn find_subscription(&self, billable_id: i64) -> AppResult<Subscription> {
        let billable = self.find_billable(billable_id).await?;
        self.subscriptions
            .find_by_name(billable.id, &self.settings.subscription_name)
            .await?
            .ok_or(AppError::NoSubscription)
    }

    async fn sync(
        &self,
        subscription: &Subscription,
        updated: ProviderSubscription,
    ) -> AppResult<Subscription> {
        self.subscriptions
            .apply_sync(subscription.id, &updated.to_sync())
            .await
    }

    async fn payment_details(
        &self,
        customer: &CustomerId,
    ) -> AppResult<(Vec<CardRecord>, Vec<InvoiceRecord>, Vec<ChargeRecord>)> {
        let limit = self.settings.payment_history_limit;
        let cards = self.provider.list_cards(customer).await?;
        let default_card = self.provider.default_card_id(customer).await?;
        let invoices = self.provider.list_invoices(customer, limit).await?;
        let charges = self.provider.list_charges(customer, limit).await?;

        Ok((
            format_cards(&cards, default_card.as_deref()),
            format_invoices(&invoices),
            format_charges(&charges),
        ))
    }
}

fn provider_id(subscription: &Subscription) -> SubscriptionId {
    SubscriptionId::new(&subscription.provider_subscription_id)
}
