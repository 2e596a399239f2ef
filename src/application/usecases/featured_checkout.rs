use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        featured_errors::{FeaturedError, UseCaseResult},
        featured_listings::FeaturedListingsUseCase,
    },
    domain::{
        clock::Clock,
        repositories::listings::ListingRepository,
        value_objects::{
            enums::listing_kinds::ListingKind,
            featured::{CreateCheckoutRequest, FeaturedPlanDto, PromotionReceipt},
            featured_plans::{featured_plans, find_featured_plan},
        },
    },
    infrastructure::payments::stripe_client::{CheckoutLineItem, StripeClient, StripeEvent},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        line_item: CheckoutLineItem,
        metadata: HashMap<String, String>,
    ) -> AnyResult<String>;

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> AnyResult<StripeEvent>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        line_item: CheckoutLineItem,
        metadata: HashMap<String, String>,
    ) -> AnyResult<String> {
        self.create_checkout_session(line_item, metadata).await
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature, now)
    }
}

pub struct FeaturedCheckoutUseCase<R, Stripe>
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    featured_listings: Arc<FeaturedListingsUseCase<R>>,
    stripe_client: Arc<Stripe>,
    clock: Arc<dyn Clock>,
    currency: String,
}

impl<R, Stripe> FeaturedCheckoutUseCase<R, Stripe>
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        featured_listings: Arc<FeaturedListingsUseCase<R>>,
        stripe_client: Arc<Stripe>,
        clock: Arc<dyn Clock>,
        currency: String,
    ) -> Self {
        Self {
            featured_listings,
            stripe_client,
            clock,
            currency,
        }
    }

    pub fn list_plans(&self) -> Vec<FeaturedPlanDto> {
        featured_plans()
            .iter()
            .map(|plan| FeaturedPlanDto::from_plan(plan, &self.currency))
            .collect()
    }

    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        request: CreateCheckoutRequest,
    ) -> UseCaseResult<String> {
        let listing_id = request.listing_id;
        let kind = request.listing_kind;
        info!(
            %user_id,
            %listing_id,
            listing_kind = %kind,
            plan_id = %request.plan_id,
            "featured_checkout: checkout requested"
        );

        let plan = find_featured_plan(&request.plan_id).ok_or_else(|| {
            let err = FeaturedError::InvalidPlan(request.plan_id.clone());
            warn!(
                %user_id,
                plan_id = %request.plan_id,
                status = err.status_code().as_u16(),
                "featured_checkout: unknown plan"
            );
            err
        })?;

        let (collection, listing) = self
            .featured_listings
            .resolve_listing(listing_id, kind)
            .await?;

        if listing.owner_id != user_id {
            let err = FeaturedError::Forbidden;
            warn!(
                %user_id,
                %listing_id,
                owner_id = %listing.owner_id,
                status = err.status_code().as_u16(),
                "featured_checkout: checkout attempted by non-owner"
            );
            return Err(err);
        }

        let line_item = CheckoutLineItem {
            product_name: format!("Featured listing - {}", plan.name),
            unit_amount_minor: plan.price_minor,
            currency: self.currency.clone(),
        };
        let metadata = HashMap::from([
            ("listing_id".to_string(), listing_id.to_string()),
            ("listing_kind".to_string(), kind.to_string()),
            ("plan_id".to_string(), plan.id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
        ]);

        let checkout_url = self
            .stripe_client
            .create_checkout_session(line_item, metadata)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %listing_id,
                    %collection,
                    plan_id = %plan.id,
                    error = ?err,
                    "featured_checkout: stripe checkout session creation failed"
                );
                FeaturedError::RemoteStore(err)
            })?;

        info!(
            %user_id,
            %listing_id,
            plan_id = %plan.id,
            "featured_checkout: checkout session created"
        );

        Ok(checkout_url)
    }

    /// Returns the applied promotion when the event promoted a listing.
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> UseCaseResult<Option<PromotionReceipt>> {
        let event = self
            .stripe_client
            .verify_webhook_signature(payload, signature, self.clock.now())
            .map_err(|err| {
                let rejected =
                    FeaturedError::InvalidWebhook("signature verification failed".to_string());
                warn!(
                    error = %err,
                    status = rejected.status_code().as_u16(),
                    "featured_checkout: stripe webhook verification failed"
                );
                rejected
            })?;

        info!(event_type = %event.type_, "featured_checkout: stripe webhook verified");

        match event.type_.as_str() {
            "checkout.session.completed" => self.handle_checkout_completed(&event).await,
            _ => {
                debug!(event_type = %event.type_, "featured_checkout: ignoring stripe event");
                Ok(None)
            }
        }
    }

    /// Events Stripe would keep redelivering for days are acknowledged with
    /// `Ok(None)`; only store failures are returned so Stripe retries them.
    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> UseCaseResult<Option<PromotionReceipt>> {
        let Some(session) = StripeClient::extract_checkout_session(event) else {
            warn!(event_id = ?event.id, "featured_checkout: completed event without checkout session");
            return Ok(None);
        };

        if let Some(payment_status) = session.payment_status.as_deref() {
            if payment_status != "paid" {
                info!(
                    session_id = ?session.id,
                    payment_status,
                    "featured_checkout: checkout completed without payment, not promoting"
                );
                return Ok(None);
            }
        }

        let (listing_id, kind, plan_id) = match checkout_target(&session.metadata) {
            Ok(target) => target,
            Err(reason) => {
                warn!(
                    session_id = ?session.id,
                    reason,
                    "featured_checkout: checkout metadata not ours, acknowledging"
                );
                return Ok(None);
            }
        };

        let paid_since = session
            .created
            .or(event.created)
            .and_then(|created| DateTime::from_timestamp(created, 0));

        info!(
            %listing_id,
            listing_kind = %kind,
            plan_id = %plan_id,
            session_id = ?session.id,
            "featured_checkout: promoting listing from checkout"
        );

        match self
            .featured_listings
            .promote_paid_listing(listing_id, kind, plan_id, paid_since)
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(err @ (FeaturedError::NotFound | FeaturedError::InvalidPlan(_))) => {
                warn!(
                    %listing_id,
                    plan_id,
                    session_id = ?session.id,
                    error = %err,
                    "featured_checkout: paid checkout cannot be applied, acknowledging"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn checkout_target(
    metadata: &Option<HashMap<String, String>>,
) -> Result<(Uuid, ListingKind, &str), &'static str> {
    let metadata = metadata.as_ref().ok_or("missing metadata")?;

    let listing_id = metadata
        .get("listing_id")
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or("missing listing_id")?;
    let kind = metadata
        .get("listing_kind")
        .and_then(|value| value.parse::<ListingKind>().ok())
        .ok_or("missing listing_kind")?;
    let plan_id = metadata.get("plan_id").ok_or("missing plan_id")?;

    Ok((listing_id, kind, plan_id.as_str()))
}
