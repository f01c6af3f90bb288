pub mod models;
pub mod repository;
pub mod payment;
pub mod cms;

pub use models::{CurrentUser, Order, OrderItem, Product, ProductDraft, Rating, Review, ShippingAddress};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
