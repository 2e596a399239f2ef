use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    application::usecases::{
        featured_checkout::FeaturedCheckoutUseCase, featured_listings::FeaturedListingsUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::clock::{Clock, SystemClock},
    infrastructure::{
        axum_http::{
            auth::AuthConfig,
            default_routers,
            routers::{self, featured::FeaturedRouterState},
        },
        payments::stripe_client::StripeClient,
        postgres::{postgres_connection::PgPoolSquad, repositories::listings::ListingPostgres},
    },
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let listing_repository = Arc::new(ListingPostgres::new(Arc::clone(&db_pool)));
    let listings_usecase = Arc::new(FeaturedListingsUseCase::new(
        listing_repository,
        Arc::clone(&clock),
    ));

    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
        config.stripe.success_url.clone(),
        config.stripe.cancel_url.clone(),
    ));
    let checkout_usecase = Arc::new(FeaturedCheckoutUseCase::new(
        Arc::clone(&listings_usecase),
        stripe_client,
        clock,
        config.featured.currency.clone(),
    ));

    let auth_config = Arc::new(AuthConfig {
        jwt_secret: config.supabase.jwt_secret.clone(),
    });

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/featured",
            routers::featured::routes(Arc::new(FeaturedRouterState {
                checkout_usecase,
                listings_usecase: Arc::clone(&listings_usecase),
            })),
        )
        .nest(
            "/api/v1/listings",
            routers::listings::routes(listings_usecase),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(auth_config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static("stripe-signature"),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "http: failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "http: failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
