use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use uuid::Uuid;

use crate::{
    application::usecases::featured_listings::FeaturedListingsUseCase,
    domain::{
        repositories::listings::ListingRepository,
        value_objects::enums::listing_kinds::ListingKind,
    },
    infrastructure::axum_http::{auth::AuthUser, routers::featured::map_error},
};

pub fn routes<R>(usecase: Arc<FeaturedListingsUseCase<R>>) -> Router
where
    R: ListingRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/:kind", get(list_ranked::<R>))
        .route("/:kind/featured", get(list_featured::<R>))
        .route("/:kind/:listing_id/featured", get(featured_status::<R>))
        .with_state(usecase)
}

/// Every listing of the kind, featured ones placed into every 7th slot.
pub async fn list_ranked<R>(
    State(usecase): State<Arc<FeaturedListingsUseCase<R>>>,
    Path(kind): Path<ListingKind>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
{
    match usecase.list_ranked(kind).await {
        Ok(ranked) => (StatusCode::OK, Json(ranked)).into_response(),
        Err(err) => map_error("list_ranked", err),
    }
}

pub async fn list_featured<R>(
    State(usecase): State<Arc<FeaturedListingsUseCase<R>>>,
    Path(kind): Path<ListingKind>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
{
    match usecase.list_featured(kind).await {
        Ok(featured) => (StatusCode::OK, Json(featured)).into_response(),
        Err(err) => map_error("list_featured", err),
    }
}

pub async fn featured_status<R>(
    State(usecase): State<Arc<FeaturedListingsUseCase<R>>>,
    _auth: AuthUser,
    Path((kind, listing_id)): Path<(ListingKind, Uuid)>,
) -> Response
where
    R: ListingRepository + Send + Sync + 'static,
{
    match usecase.check_featured_status(listing_id, kind).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => map_error("featured_status", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            clock::MockClock, entities::listings::ListingEntity,
            repositories::listings::MockListingRepository,
            value_objects::enums::listing_kinds::ListingCollection,
        },
        infrastructure::axum_http::auth::tests::{SECRET, auth_config, user_token},
    };
    use axum::{Extension, body::Body, http::Request};
    use chrono::{DateTime, Duration, Utc};
    use mockall::predicate::eq;
    use tower::ServiceExt;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn listing(title: &str, age_days: i64) -> ListingEntity {
        ListingEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.to_string(),
            city: None,
            price_minor: None,
            photos: serde_json::json!([]),
            featured: false,
            featured_until: None,
            featured_at: None,
            featured_plan: None,
            featured_price: None,
            payment_status: None,
            created_at: now() - Duration::days(age_days),
        }
    }

    fn router(repo: MockListingRepository) -> Router {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now());
        routes(Arc::new(FeaturedListingsUseCase::new(
            Arc::new(repo),
            Arc::new(clock),
        )))
        .layer(Extension(auth_config()))
    }

    fn status_request(uri: &str, bearer: Option<String>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn ranked_route_accepts_plural_kind_segment() {
        let mut repo = MockListingRepository::new();
        repo.expect_list_all()
            .with(eq(ListingCollection::DigitalScreens))
            .returning(|_| Ok(vec![listing("lobby screen", 1)]));

        let response = router(repo)
            .oneshot(
                Request::get("/digital-screens")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_before_store_access() {
        let mut repo = MockListingRepository::new();
        repo.expect_list_all().times(0);

        let response = router(repo)
            .oneshot(Request::get("/boats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn store_failures_surface_as_500() {
        let mut repo = MockListingRepository::new();
        repo.expect_list_flagged_featured()
            .returning(|_| Err(anyhow::anyhow!("pool timed out")));

        let response = router(repo)
            .oneshot(Request::get("/jobs/featured").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn status_route_requires_a_bearer_token() {
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id().times(0);
        repo.expect_clear_featured().times(0);

        let response = router(repo)
            .oneshot(status_request(
                &format!("/billboards/{}/featured", Uuid::new_v4()),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn status_route_expires_a_lapsed_promotion() {
        let listing_id = Uuid::new_v4();
        let mut lapsed = listing("rooftop billboard", 20);
        lapsed.id = listing_id;
        lapsed.featured = true;
        lapsed.featured_at = Some(now() - Duration::days(8));
        lapsed.featured_until = Some(now() - Duration::days(1));
        lapsed.featured_plan = Some("1_week".to_string());

        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id()
            .with(eq(ListingCollection::Billboards), eq(listing_id))
            .returning(move |_, _| Ok(Some(lapsed.clone())));
        repo.expect_clear_featured()
            .with(eq(ListingCollection::Billboards), eq(listing_id), eq(now()))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let response = router(repo)
            .oneshot(status_request(
                &format!("/billboards/{listing_id}/featured"),
                Some(user_token(SECRET, 9999999999)),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let status: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status["featured"], serde_json::json!(false));
        assert_eq!(status["featured_until"], serde_json::Value::Null);
    }
}
