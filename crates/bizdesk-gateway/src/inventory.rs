use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bizdesk_core::inventory::{InventoryAlert, Product, StockMovement, StockMovementType};
use bizdesk_core::{DomainEventKind, EntityKind};
use bizdesk_inventory::{
    InventoryStats, ProductDraft, ProductFilter, StockLedger, StockMovementDraft,
    StockMovementFilter, StockStats,
};
use bizdesk_platform::ConfirmQuery;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::desk_error;
use crate::state::AppState;

type ApiError = (StatusCode, String);

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProductList {
    products: Vec<Product>,
    stats: InventoryStats,
}

pub(crate) async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<ProductList> {
    let desk = state.desk.read().await;
    Json(ProductList {
        products: desk.catalog.filter(&filter).into_iter().cloned().collect(),
        stats: desk.catalog.stats(),
    })
}

pub(crate) async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = {
        let mut desk = state.desk.write().await;
        let product = desk.catalog.create(payload).map_err(desk_error)?;
        desk.refresh_alerts();
        product
    };

    state
        .record(
            product.id,
            EntityKind::Product,
            DomainEventKind::RecordCreated,
            format!("product {} {} created", product.code, product.name),
            &product,
        )
        .await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(crate) async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    let product = {
        let mut desk = state.desk.write().await;
        let product = desk.catalog.update(id, payload).map_err(desk_error)?;
        desk.refresh_alerts();
        product
    };

    state
        .record(
            product.id,
            EntityKind::Product,
            DomainEventKind::RecordUpdated,
            format!("product {} updated", product.code),
            &product,
        )
        .await;
    Ok(Json(product))
}

pub(crate) async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Product>, ApiError> {
    confirm.require("deleting a product").map_err(desk_error)?;
    let product = {
        let mut desk = state.desk.write().await;
        let product = desk.catalog.delete(id).map_err(desk_error)?;
        desk.refresh_alerts();
        product
    };

    state
        .record(
            product.id,
            EntityKind::Product,
            DomainEventKind::RecordDeleted,
            format!("product {} deleted", product.code),
            &product,
        )
        .await;
    Ok(Json(product))
}

pub(crate) async fn list_alerts(State(state): State<AppState>) -> Json<Vec<InventoryAlert>> {
    Json(state.desk.read().await.alerts.alerts().to_vec())
}

pub(crate) async fn acknowledge_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<InventoryAlert>, ApiError> {
    let alert = state
        .desk
        .write()
        .await
        .alerts
        .acknowledge(&alert_id)
        .map_err(desk_error)?;

    state
        .record(
            alert.product_id,
            EntityKind::InventoryAlert,
            DomainEventKind::StatusChanged,
            format!("alert for {} acknowledged", alert.product_code),
            &alert,
        )
        .await;
    Ok(Json(alert))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StockList {
    movements: Vec<StockMovement>,
    stats: StockStats,
}

pub(crate) async fn list_stock_movements(
    State(state): State<AppState>,
    Query(filter): Query<StockMovementFilter>,
) -> Json<StockList> {
    let desk = state.desk.read().await;
    Json(StockList {
        movements: desk.stock.filter(&filter).into_iter().cloned().collect(),
        stats: desk.stock.stats(),
    })
}

pub(crate) async fn record_stock_movement(
    State(state): State<AppState>,
    Json(payload): Json<StockMovementDraft>,
) -> Result<(StatusCode, Json<StockMovement>), ApiError> {
    let movement = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        let movement = desk
            .stock
            .record(&mut desk.catalog, payload)
            .map_err(desk_error)?;
        desk.refresh_alerts();
        movement
    };

    state
        .record(
            movement.product_id,
            EntityKind::StockMovement,
            DomainEventKind::StockMoved,
            format!(
                "stock of {} moved from {} to {}",
                movement.product_code, movement.previous_stock, movement.new_stock
            ),
            &movement,
        )
        .await;
    Ok((StatusCode::CREATED, Json(movement)))
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PreviewQuery {
    product_id: Uuid,
    movement_type: StockMovementType,
    quantity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StockPreview {
    product_id: Uuid,
    projected_stock: Decimal,
}

pub(crate) async fn preview_stock(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<StockPreview>, ApiError> {
    let projected_stock = StockLedger::preview(
        &state.desk.read().await.catalog,
        query.product_id,
        query.movement_type,
        query.quantity,
    )
    .map_err(desk_error)?;

    Ok(Json(StockPreview {
        product_id: query.product_id,
        projected_stock,
    }))
}
