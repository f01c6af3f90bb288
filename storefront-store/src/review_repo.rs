use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use storefront_core::models::{Rating, Review};
use storefront_core::repository::ReviewRepository;

pub struct StoreReviewRepository {
    pool: PgPool,
}

impl StoreReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: String,
    user_id: String,
    author_name: String,
    comment: String,
    rating: i16,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = storefront_core::CoreError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            author_name: row.author_name,
            comment: row.comment,
            rating: Rating::try_from(i64::from(row.rating))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_reviews(
    rows: Vec<ReviewRow>,
) -> Result<Vec<Review>, Box<dyn std::error::Error + Send + Sync>> {
    rows.into_iter()
        .map(|row| Review::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl ReviewRepository for StoreReviewRepository {
    async fn create_review(
        &self,
        review: &Review,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, product_id, user_id, author_name, comment, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(review.id)
        .bind(&review.product_id)
        .bind(&review.user_id)
        .bind(&review.author_name)
        .bind(&review.comment)
        .bind(i16::from(review.rating.value()))
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(review.id)
    }

    async fn list_reviews(
        &self,
        product_id: &str,
    ) -> Result<Vec<Review>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, user_id, author_name, comment, rating, created_at, updated_at \
             FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        into_reviews(rows)
    }

    async fn find_review(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, user_id, author_name, comment, rating, created_at, updated_at \
             FROM reviews WHERE product_id = $1 AND user_id = $2 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(into_reviews(row.into_iter().collect())?.pop())
    }
}
