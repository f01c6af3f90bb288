use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use storefront_core::models::{Product, ProductDraft};
use uuid::Uuid;

use crate::{error::AppError, extract::AppJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ProductIdRequest {
    pub productid: String,
}

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub product: ProductDraft,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub productid: String,
    pub updatedproduct: ProductDraft,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/getallproducts", get(get_all_products))
        .route("/api/products/getproductbyid", post(get_product_by_id))
        .route("/api/products/addproduct", post(add_product))
        .route("/api/products/updateproduct", post(update_product))
        .route("/api/products/deleteproduct", post(delete_product))
}

fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| AppError::ValidationError(format!("invalid product id {}: {}", raw, e)))
}

async fn get_all_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.product_repo.list_products().await.map_err(AppError::storage)?;
    Ok(Json(products))
}

async fn get_product_by_id(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProductIdRequest>,
) -> Result<Json<Option<Product>>, AppError> {
    let id = parse_product_id(&req.productid)?;
    let product = state.product_repo.get_product(id).await.map_err(AppError::storage)?;
    Ok(Json(product))
}

async fn add_product(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddProductRequest>,
) -> Result<&'static str, AppError> {
    let product = Product::from_draft(req.product);
    let id = state.product_repo.create_product(&product).await.map_err(AppError::storage)?;
    tracing::info!("Product {} added: {}", id, product.name);
    Ok("Product Added Successfully")
}

async fn update_product(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateProductRequest>,
) -> Result<&'static str, AppError> {
    let id = parse_product_id(&req.productid)?;
    state
        .product_repo
        .update_product(id, &req.updatedproduct)
        .await
        .map_err(AppError::storage)?;
    Ok("Product Updated Successfully")
}

async fn delete_product(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProductIdRequest>,
) -> Result<&'static str, AppError> {
    let id = parse_product_id(&req.productid)?;
    state.product_repo.delete_product(id).await.map_err(AppError::storage)?;
    tracing::info!("Product {} deleted", id);
    Ok("Product deleted successfully")
}
