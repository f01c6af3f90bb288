use std::sync::Arc;
use storefront_catalog::ReviewService;
use storefront_core::cms::CatalogCms;
use storefront_core::payment::PaymentAdapter;
use storefront_core::repository::{OrderRepository, ProductRepository, ReviewRepository};
use storefront_order::OrderWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub order_repo: Arc<dyn OrderRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub orders: Arc<OrderWorkflow>,
    pub reviews: Arc<ReviewService>,
}

/// Collaborators the workflows are built from
pub struct Collaborators {
    pub order_repo: Arc<dyn OrderRepository>,
    pub review_repo: Arc<dyn ReviewRepository>,
    pub product_repo: Arc<dyn ProductRepository>,
    pub payment: Arc<dyn PaymentAdapter>,
    pub cms: Arc<dyn CatalogCms>,
    pub currency: String,
}

impl AppState {
    pub fn new(parts: Collaborators) -> Self {
        let orders = OrderWorkflow::new(
            parts.payment,
            parts.order_repo.clone(),
            parts.cms.clone(),
            parts.currency,
        );
        let reviews = ReviewService::new(parts.review_repo, parts.cms);

        Self {
            order_repo: parts.order_repo,
            product_repo: parts.product_repo,
            orders: Arc::new(orders),
            reviews: Arc::new(reviews),
        }
    }
}
