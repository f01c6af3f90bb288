use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use storefront_core::models::{Product, ProductDraft};
use storefront_core::repository::ProductRepository;

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    description: String,
    count_in_stock: i64,
    image: String,
    category: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            count_in_stock: row.count_in_stock,
            image: row.image,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(
        &self,
        product: &Product,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, description, count_in_stock, image, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.count_in_stock)
        .bind(&product.image)
        .bind(&product.category)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.id)
    }

    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, count_in_stock, image, category, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(
        &self,
    ) -> Result<Vec<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, count_in_stock, image, category, created_at, updated_at \
             FROM products ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(
        &self,
        id: Uuid,
        draft: &ProductDraft,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, price = $2, category = $3, description = $4, count_in_stock = $5, image = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.category)
        .bind(&draft.description)
        .bind(draft.count_in_stock)
        .bind(&draft.image)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_product(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
