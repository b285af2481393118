use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use bizdesk_core::filter::Page;
use bizdesk_core::purchasing::{PurchaseOrder, Receipt, Supplier};
use bizdesk_core::{DeskError, DomainEventKind, EntityKind};
use bizdesk_platform::{ApproveOrderRequest, ConfirmQuery, PageQuery};
use bizdesk_purchasing::{
    OrderFilter, OrderStats, PurchaseOrderDraft, ReceiptDraft, ReceiptFilter, ReceiptItemDraft,
    SupplierDraft, SupplierFilter, SupplierStats, prefill_from_order,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{csv_attachment, desk_error};
use crate::state::AppState;

type ApiError = (StatusCode, String);

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SupplierList {
    suppliers: Vec<Supplier>,
    stats: SupplierStats,
}

pub(crate) async fn list_suppliers(
    State(state): State<AppState>,
    Query(filter): Query<SupplierFilter>,
) -> Json<SupplierList> {
    let desk = state.desk.read().await;
    Json(SupplierList {
        suppliers: desk.suppliers.filter(&filter).into_iter().cloned().collect(),
        stats: desk.suppliers.stats(),
    })
}

pub(crate) async fn export_suppliers(
    State(state): State<AppState>,
    Query(filter): Query<SupplierFilter>,
) -> Result<Response, ApiError> {
    let body = state
        .desk
        .read()
        .await
        .suppliers
        .export_csv(&filter)
        .map_err(desk_error)?;
    Ok(csv_attachment("suppliers", body))
}

pub(crate) async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<SupplierDraft>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let supplier = state
        .desk
        .write()
        .await
        .suppliers
        .create(payload)
        .map_err(desk_error)?;

    state
        .record(
            supplier.id,
            EntityKind::Supplier,
            DomainEventKind::RecordCreated,
            format!("supplier {} {} created", supplier.code, supplier.name),
            &supplier,
        )
        .await;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub(crate) async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SupplierDraft>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = state
        .desk
        .write()
        .await
        .suppliers
        .update(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            supplier.id,
            EntityKind::Supplier,
            DomainEventKind::RecordUpdated,
            format!("supplier {} updated", supplier.code),
            &supplier,
        )
        .await;
    Ok(Json(supplier))
}

pub(crate) async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Supplier>, ApiError> {
    confirm.require("deleting a supplier").map_err(desk_error)?;
    let supplier = state
        .desk
        .write()
        .await
        .suppliers
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            supplier.id,
            EntityKind::Supplier,
            DomainEventKind::RecordDeleted,
            format!("supplier {} deleted", supplier.code),
            &supplier,
        )
        .await;
    Ok(Json(supplier))
}

pub(crate) async fn toggle_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = state
        .desk
        .write()
        .await
        .suppliers
        .toggle_status(id)
        .map_err(desk_error)?;

    state
        .record(
            supplier.id,
            EntityKind::Supplier,
            DomainEventKind::StatusChanged,
            format!("supplier {} is now {}", supplier.code, supplier.status.label()),
            &supplier,
        )
        .await;
    Ok(Json(supplier))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OrderList {
    orders: Vec<PurchaseOrder>,
    stats: OrderStats,
}

pub(crate) async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Json<OrderList> {
    let desk = state.desk.read().await;
    Json(OrderList {
        orders: desk.orders.filter(&filter).into_iter().cloned().collect(),
        stats: desk.orders.stats(),
    })
}

pub(crate) async fn export_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Response, ApiError> {
    let body = state
        .desk
        .read()
        .await
        .orders
        .export_csv(&filter)
        .map_err(desk_error)?;
    Ok(csv_attachment("purchase_orders", body))
}

pub(crate) async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let order = state.desk.read().await.orders.get(id).cloned();
    order
        .map(Json)
        .ok_or_else(|| desk_error(DeskError::not_found("purchase order", id)))
}

pub(crate) async fn receipt_items_for_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReceiptItemDraft>>, ApiError> {
    let desk = state.desk.read().await;
    let order = desk
        .orders
        .get(id)
        .ok_or_else(|| desk_error(DeskError::not_found("purchase order", id)))?;
    Ok(Json(prefill_from_order(order)))
}

pub(crate) async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseOrderDraft>,
) -> Result<(StatusCode, Json<PurchaseOrder>), ApiError> {
    let order = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        desk.orders
            .create(payload, &desk.suppliers, &desk.catalog)
            .map_err(desk_error)?
    };

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::RecordCreated,
            format!(
                "purchase order {} for {} created ({} {})",
                order.order_number, order.supplier_name, order.total_amount, order.currency
            ),
            &order,
        )
        .await;
    Ok((StatusCode::CREATED, Json(order)))
}

pub(crate) async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseOrderDraft>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let order = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        desk.orders
            .update(id, payload, &desk.suppliers, &desk.catalog)
            .map_err(desk_error)?
    };

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::RecordUpdated,
            format!("purchase order {} updated", order.order_number),
            &order,
        )
        .await;
    Ok(Json(order))
}

pub(crate) async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    confirm
        .require("deleting a purchase order")
        .map_err(desk_error)?;
    let order = state
        .desk
        .write()
        .await
        .orders
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::RecordDeleted,
            format!("purchase order {} deleted", order.order_number),
            &order,
        )
        .await;
    Ok(Json(order))
}

pub(crate) async fn approve_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveOrderRequest>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let approved_by = payload.approved_by.unwrap_or_else(|| "Current user".to_string());
    let order = state
        .desk
        .write()
        .await
        .orders
        .approve(id, &approved_by)
        .map_err(desk_error)?;

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::StatusChanged,
            format!("purchase order {} approved by {approved_by}", order.order_number),
            &order,
        )
        .await;
    Ok(Json(order))
}

pub(crate) async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    confirm
        .require("cancelling a purchase order")
        .map_err(desk_error)?;
    let order = state
        .desk
        .write()
        .await
        .orders
        .cancel(id)
        .map_err(desk_error)?;

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::StatusChanged,
            format!("purchase order {} cancelled", order.order_number),
            &order,
        )
        .await;
    Ok(Json(order))
}

pub(crate) async fn duplicate_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<PurchaseOrder>), ApiError> {
    let order = state
        .desk
        .write()
        .await
        .orders
        .duplicate(id)
        .map_err(desk_error)?;

    state
        .record(
            order.id,
            EntityKind::PurchaseOrder,
            DomainEventKind::RecordCreated,
            format!("purchase order {} created as a copy", order.order_number),
            &order,
        )
        .await;
    Ok((StatusCode::CREATED, Json(order)))
}

pub(crate) async fn list_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
    Query(page): Query<PageQuery>,
) -> Json<Page<Receipt>> {
    let per_page = state.config.page_size;
    Json(
        state
            .desk
            .read()
            .await
            .receipts
            .page(&filter, page.number(), per_page),
    )
}

pub(crate) async fn export_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> Result<Response, ApiError> {
    let body = state
        .desk
        .read()
        .await
        .receipts
        .export_csv(&filter)
        .map_err(desk_error)?;
    Ok(csv_attachment("receipts", body))
}

pub(crate) async fn create_receipt(
    State(state): State<AppState>,
    Json(payload): Json<ReceiptDraft>,
) -> Result<(StatusCode, Json<Receipt>), ApiError> {
    let (receipt, order) = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        let receipt = desk
            .receipts
            .create(payload, &mut desk.orders, &desk.suppliers, &desk.catalog)
            .map_err(desk_error)?;
        let order = desk.orders.get(receipt.purchase_order_id).cloned();
        (receipt, order)
    };

    state
        .record(
            receipt.id,
            EntityKind::Receipt,
            DomainEventKind::RecordCreated,
            format!(
                "receipt {} recorded for order {}",
                receipt.receipt_number, receipt.purchase_order_number
            ),
            &receipt,
        )
        .await;
    if let Some(order) = order {
        state
            .record(
                order.id,
                EntityKind::PurchaseOrder,
                DomainEventKind::GoodsReceived,
                format!(
                    "purchase order {} is now {}",
                    order.order_number,
                    order.status.label()
                ),
                &order,
            )
            .await;
    }
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub(crate) async fn update_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiptDraft>,
) -> Result<Json<Receipt>, ApiError> {
    let receipt = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        desk.receipts
            .update(id, payload, &desk.orders, &desk.suppliers, &desk.catalog)
            .map_err(desk_error)?
    };

    state
        .record(
            receipt.id,
            EntityKind::Receipt,
            DomainEventKind::RecordUpdated,
            format!("receipt {} updated", receipt.receipt_number),
            &receipt,
        )
        .await;
    Ok(Json(receipt))
}

pub(crate) async fn delete_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Receipt>, ApiError> {
    confirm.require("deleting a receipt").map_err(desk_error)?;
    let receipt = state
        .desk
        .write()
        .await
        .receipts
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            receipt.id,
            EntityKind::Receipt,
            DomainEventKind::RecordDeleted,
            format!("receipt {} deleted", receipt.receipt_number),
            &receipt,
        )
        .await;
    Ok(Json(receipt))
}
