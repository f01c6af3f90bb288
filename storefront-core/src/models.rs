use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::CoreError;

/// The signed-in shopper as sent by the storefront client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A cart line. `product_id` is the CMS entry uid; anything else the client
/// sends (name, price, image...) is kept verbatim in `details`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            details: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

/// A placed order. Only ever created after the charge went through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(rename = "name")]
    pub customer_name: String,
    #[serde(rename = "email")]
    pub customer_email: String,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub order_amount: f64,
    pub transaction_id: String,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user: &CurrentUser,
        order_items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        order_amount: f64,
        transaction_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user.id.clone(),
            customer_name: user.name.clone(),
            customer_email: user.email.clone(),
            order_items,
            shipping_address,
            order_amount,
            transaction_id,
            is_delivered: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoreError::ValidationError(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "productid")]
    pub product_id: String,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(rename = "name")]
    pub author_name: String,
    pub comment: String,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(product_id: String, author: &CurrentUser, rating: Rating, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            user_id: author.id.clone(),
            author_name: author.name.clone(),
            comment,
            rating,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable product fields, as posted by the admin screens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count_in_stock: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub count_in_stock: i64,
    pub image: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_draft(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            price: draft.price,
            description: draft.description,
            count_in_stock: draft.count_in_stock,
            image: draft.image,
            category: draft.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy every editable field from `draft`
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.price = draft.price;
        self.description = draft.description;
        self.count_in_stock = draft.count_in_stock;
        self.image = draft.image;
        self.category = draft.category;
        self.updated_at = Utc::now();
    }
}
