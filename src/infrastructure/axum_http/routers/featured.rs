use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    application::usecases::{
        featured_checkout::{FeaturedCheckoutUseCase, StripeGateway},
        featured_errors::FeaturedError,
        featured_listings::FeaturedListingsUseCase,
    },
    domain::{
        repositories::listings::ListingRepository,
        value_objects::featured::{
            CreateCheckoutRequest, CreateCheckoutResponse, PromoteListingRequest,
        },
    },
    infrastructure::axum_http::{auth::AuthUser, error_responses::AppError},
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub struct FeaturedRouterState<R, Stripe>
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    pub checkout_usecase: Arc<FeaturedCheckoutUseCase<R, Stripe>>,
    pub listings_usecase: Arc<FeaturedListingsUseCase<R>>,
}

pub fn routes<R, Stripe>(state: Arc<FeaturedRouterState<R, Stripe>>) -> Router
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/plans", get(list_plans::<R, Stripe>))
        .route("/checkout", post(create_checkout::<R, Stripe>))
        .route("/webhook", post(stripe_webhook::<R, Stripe>))
        .route("/promote", post(promote::<R, Stripe>))
        .with_state(state)
}

pub async fn list_plans<R, Stripe>(
    State(state): State<Arc<FeaturedRouterState<R, Stripe>>>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    (StatusCode::OK, Json(state.checkout_usecase.list_plans())).into_response()
}

pub async fn create_checkout<R, Stripe>(
    State(state): State<Arc<FeaturedRouterState<R, Stripe>>>,
    auth: AuthUser,
    Json(request): Json<CreateCheckoutRequest>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    // Service-role keys have no user to own a listing.
    let Some(user_id) = auth.user_id else {
        return map_error("create_checkout", FeaturedError::Unauthenticated);
    };

    match state
        .checkout_usecase
        .create_checkout_session(user_id, request)
        .await
    {
        Ok(checkout_url) => {
            (StatusCode::OK, Json(CreateCheckoutResponse { checkout_url })).into_response()
        }
        Err(err) => map_error("create_checkout", err),
    }
}

pub async fn stripe_webhook<R, Stripe>(
    State(state): State<Arc<FeaturedRouterState<R, Stripe>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("featured router: stripe webhook without signature header");
        return AppError::BadRequest("missing Stripe-Signature header".to_string())
            .into_response();
    };

    match state
        .checkout_usecase
        .handle_stripe_webhook(&body, signature)
        .await
    {
        Ok(receipt) => {
            if let Some(receipt) = receipt {
                info!(
                    listing_id = %receipt.listing_id,
                    plan_id = %receipt.plan_id,
                    "featured router: webhook promoted listing"
                );
            }
            (StatusCode::OK, Json(json!({ "received": true }))).into_response()
        }
        Err(err) => map_error("stripe_webhook", err),
    }
}

/// Manual grant. Only service-role tokens may call it.
pub async fn promote<R, Stripe>(
    State(state): State<Arc<FeaturedRouterState<R, Stripe>>>,
    auth: AuthUser,
    Json(request): Json<PromoteListingRequest>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
    Stripe: StripeGateway + Send + Sync + 'static,
{
    if !auth.is_service_role() {
        warn!(
            user_id = ?auth.user_id,
            role = %auth.role,
            "featured router: promote rejected for non service role"
        );
        return map_error("promote", FeaturedError::Forbidden);
    }

    match state
        .listings_usecase
        .promote_listing(request.listing_id, request.listing_kind, &request.plan_id)
        .await
    {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => map_error("promote", err),
    }
}

pub(super) fn map_error(label: &str, err: FeaturedError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!(status = status.as_u16(), error = ?err, "featured router: {} failed", label);
    } else {
        warn!(status = status.as_u16(), error = %err, "featured router: {} rejected", label);
    }
    AppError::from(err).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usecases::featured_checkout::MockStripeGateway,
        domain::{
            clock::{Clock, MockClock},
            entities::listings::ListingEntity,
            repositories::listings::MockListingRepository,
        },
        infrastructure::axum_http::auth::tests::{
            SECRET, auth_config, service_role_key, user_token,
        },
    };
    use axum::{Extension, body::Body, http::Request};
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const PROMOTE_BODY: &str = r#"{"listing_id":"123e4567-e89b-12d3-a456-426614174000","listing_kind":"job","plan_id":"1_week"}"#;

    fn router(repo: MockListingRepository, stripe: MockStripeGateway) -> Router {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(Utc::now());
        let clock: Arc<dyn Clock> = Arc::new(clock);

        let listings_usecase = Arc::new(FeaturedListingsUseCase::new(
            Arc::new(repo),
            Arc::clone(&clock),
        ));
        let checkout_usecase = Arc::new(FeaturedCheckoutUseCase::new(
            Arc::clone(&listings_usecase),
            Arc::new(stripe),
            clock,
            "usd".to_string(),
        ));

        routes(Arc::new(FeaturedRouterState {
            checkout_usecase,
            listings_usecase,
        }))
        .layer(Extension(auth_config()))
    }

    fn job_listing(id: Uuid) -> ListingEntity {
        ListingEntity {
            id,
            owner_id: Uuid::new_v4(),
            title: "Night shift forklift operator".to_string(),
            city: None,
            price_minor: Some(450_000),
            photos: serde_json::json!([]),
            featured: false,
            featured_until: None,
            featured_at: None,
            featured_plan: None,
            featured_price: None,
            payment_status: None,
            created_at: Utc::now(),
        }
    }

    fn post_json(uri: &str, body: &str, bearer: Option<String>) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn plans_are_public() {
        let app = router(MockListingRepository::new(), MockStripeGateway::new());

        let response = app
            .oneshot(Request::get("/plans").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn promote_requires_a_bearer_token() {
        let mut repo = MockListingRepository::new();
        repo.expect_apply_promotion().times(0);

        let response = router(repo, MockStripeGateway::new())
            .oneshot(post_json("/promote", PROMOTE_BODY, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn promote_is_forbidden_for_signed_in_users() {
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id().times(0);
        repo.expect_apply_promotion().times(0);

        let response = router(repo, MockStripeGateway::new())
            .oneshot(post_json(
                "/promote",
                PROMOTE_BODY,
                Some(user_token(SECRET, 9999999999)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn promote_accepts_the_project_service_role_key() {
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id()
            .returning(|_, id| Ok(Some(job_listing(id))));
        repo.expect_apply_promotion()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let response = router(repo, MockStripeGateway::new())
            .oneshot(post_json(
                "/promote",
                PROMOTE_BODY,
                Some(service_role_key(SECRET)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn checkout_needs_a_user_not_a_service_key() {
        let mut stripe = MockStripeGateway::new();
        stripe.expect_create_checkout_session().times(0);

        let response = router(MockListingRepository::new(), stripe)
            .oneshot(post_json(
                "/checkout",
                PROMOTE_BODY,
                Some(service_role_key(SECRET)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_without_signature_is_rejected() {
        let mut stripe = MockStripeGateway::new();
        stripe.expect_verify_webhook_signature().times(0);

        let response = router(MockListingRepository::new(), stripe)
            .oneshot(Request::post("/webhook").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected() {
        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_verify_webhook_signature()
            .returning(|_, _, _| Err(anyhow::anyhow!("invalid webhook signature")));
        let mut repo = MockListingRepository::new();
        repo.expect_apply_promotion().times(0);

        let response = router(repo, stripe)
            .oneshot(
                Request::post("/webhook")
                    .header(STRIPE_SIGNATURE_HEADER, "t=1,v1=00")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
