pub mod app_config;
pub mod database;
pub mod order_repo;
pub mod review_repo;
pub mod product_repo;
pub mod memory_repo;
pub mod cms_client;
pub mod stripe_adapter;

pub use database::DbClient;
pub use memory_repo::MemoryStore;
pub use cms_client::ContentstackClient;
pub use stripe_adapter::StripePaymentAdapter;
