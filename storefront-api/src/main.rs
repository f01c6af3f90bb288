use std::net::SocketAddr;
use std::sync::Arc;

use storefront_api::{app, AppState, Collaborators};
use storefront_core::payment::{MockPaymentAdapter, PaymentAdapter};
use storefront_store::app_config::{Config, PaymentProvider};
use storefront_store::order_repo::StoreOrderRepository;
use storefront_store::product_repo::StoreProductRepository;
use storefront_store::review_repo::StoreReviewRepository;
use storefront_store::{ContentstackClient, DbClient, StripePaymentAdapter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting storefront API on port {}", config.server.port);

    // Postgres
    let db = DbClient::connect(&config.database)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let payment: Arc<dyn PaymentAdapter> = match config.payment.provider {
        PaymentProvider::Stripe => Arc::new(
            StripePaymentAdapter::new(&config.payment).expect("Failed to build payment client"),
        ),
        PaymentProvider::Mock => {
            tracing::warn!("Using mock payment provider; no real charges will be made");
            Arc::new(MockPaymentAdapter::new())
        }
    };

    let cms = ContentstackClient::new(config.cms.clone(), config.automations.clone())
        .expect("Failed to build CMS client");

    let app_state = AppState::new(Collaborators {
        order_repo: Arc::new(StoreOrderRepository::new(db.pool.clone())),
        review_repo: Arc::new(StoreReviewRepository::new(db.pool.clone())),
        product_repo: Arc::new(StoreProductRepository::new(db.pool.clone())),
        payment,
        cms: Arc::new(cms),
        currency: config.payment.currency.clone(),
    });

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
