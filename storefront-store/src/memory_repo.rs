use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;
use storefront_core::models::{Order, Product, ProductDraft, Review};
use storefront_core::repository::{OrderRepository, ProductRepository, ReviewRepository};

/// In-process store backing all three repositories. Used by tests and by
/// local runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<Vec<Order>>,
    reviews: RwLock<Vec<Review>>,
    products: RwLock<Vec<Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> Box<dyn std::error::Error + Send + Sync> {
    "memory store lock poisoned".into()
}

fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    // Stable sort, so insertion order breaks ties
    items.reverse();
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.orders.write().map_err(poisoned)?.push(order.clone());
        Ok(order.id)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().map_err(poisoned)?;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders: Vec<Order> = self
            .orders
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }

    async fn list_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().map_err(poisoned)?.clone();
        Ok(newest_first(orders, |o| o.created_at))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.reviews.write().map_err(poisoned)?.push(review.clone());
        Ok(review.id)
    }

    async fn list_reviews(
        &self,
        product_id: &str,
    ) -> Result<Vec<Review>, Box<dyn std::error::Error + Send + Sync>> {
        let reviews: Vec<Review> = self
            .reviews
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        Ok(newest_first(reviews, |r| r.created_at))
    }

    async fn find_review(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, Box<dyn std::error::Error + Send + Sync>> {
        let reviews = self.reviews.read().map_err(poisoned)?;
        Ok(reviews
            .iter()
            .find(|r| r.product_id == product_id && r.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        self.products.write().map_err(poisoned)?.push(product.clone());
        Ok(product.id)
    }

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(
        &self,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.products.read().map_err(poisoned)?.clone())
    }

    async fn update_product(
        &self,
        id: Uuid,
        draft: &ProductDraft,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut products = self.products.write().map_err(poisoned)?;
        if let Some(product) = products.iter_mut().find(|p| p.id == id) {
            product.apply(draft.clone());
        }
        Ok(())
    }

    async fn delete_product(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.products.write().map_err(poisoned)?.retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::models::{CurrentUser, OrderItem, Rating, ShippingAddress};

    fn shopper(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_orders_listed_newest_first() {
        let store = MemoryStore::new();
        let user = shopper("u-1");

        let mut older = Order::new(&user, vec![OrderItem::new("blt1", 1)], ShippingAddress::default(), 10.0, "card_a".to_string());
        older.created_at = older.created_at - chrono::Duration::minutes(5);
        let newer = Order::new(&user, vec![OrderItem::new("blt2", 1)], ShippingAddress::default(), 20.0, "card_b".to_string());
        let other = Order::new(&shopper("u-2"), vec![], ShippingAddress::default(), 5.0, "card_c".to_string());

        store.create_order(&older).await.unwrap();
        store.create_order(&newer).await.unwrap();
        store.create_order(&other).await.unwrap();

        let mine = store.list_orders_for_user("u-1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer.id);
        assert_eq!(mine[1].id, older.id);

        assert_eq!(store.list_orders().await.unwrap().len(), 3);
        assert_eq!(store.get_order(other.id).await.unwrap().unwrap().user_id, "u-2");
    }

    #[tokio::test]
    async fn test_duplicate_reviews_are_accepted() {
        let store = MemoryStore::new();
        let user = shopper("u-1");
        let rating = Rating::try_from(4).unwrap();

        store.create_review(&Review::new("blt1".to_string(), &user, rating, "ok".to_string())).await.unwrap();
        store.create_review(&Review::new("blt1".to_string(), &user, rating, "again".to_string())).await.unwrap();

        assert_eq!(store.list_reviews("blt1").await.unwrap().len(), 2);
        assert!(store.find_review("blt1", "u-1").await.unwrap().is_some());
        assert!(store.find_review("blt1", "u-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_crud() {
        let store = MemoryStore::new();
        let draft = ProductDraft {
            name: "Kettle".to_string(),
            price: 1299.0,
            description: "1.5L".to_string(),
            count_in_stock: 4,
            image: "kettle.png".to_string(),
            category: "kitchen".to_string(),
        };
        let product = Product::from_draft(draft.clone());
        store.create_product(&product).await.unwrap();

        let renamed = ProductDraft { name: "Steel Kettle".to_string(), ..draft };
        store.update_product(product.id, &renamed).await.unwrap();
        assert_eq!(store.get_product(product.id).await.unwrap().unwrap().name, "Steel Kettle");

        // Unknown ids are a no-op
        store.update_product(Uuid::new_v4(), &renamed).await.unwrap();

        store.delete_product(product.id).await.unwrap();
        assert!(store.list_products().await.unwrap().is_empty());
    }
}
