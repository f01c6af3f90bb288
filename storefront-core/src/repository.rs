use async_trait::async_trait;
use uuid::Uuid;
use crate::models::{Order, Product, ProductDraft, Review};

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Orders placed by `user_id`, newest first
    async fn list_orders_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Every order, newest first
    async fn list_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for review data access
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    /// Reviews for one product, newest first
    async fn list_reviews(
        &self,
        product_id: &str,
    ) -> Result<Vec<Review>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_review(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the local product catalog
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_products(
        &self,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>>;

    /// Updating an unknown id is not an error
    async fn update_product(
        &self,
        id: Uuid,
        draft: &ProductDraft,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_product(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
