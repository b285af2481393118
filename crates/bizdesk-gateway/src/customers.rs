use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use bizdesk_core::crm::Customer;
use bizdesk_core::filter::Page;
use bizdesk_core::{DomainEventKind, EntityKind};
use bizdesk_crm::{CustomerDraft, CustomerFilter, CustomerStats};
use bizdesk_platform::{ConfirmQuery, PageQuery};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{csv_attachment, desk_error};
use crate::state::AppState;

type ApiError = (StatusCode, String);

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CustomerList {
    page: Page<Customer>,
    stats: CustomerStats,
    next_code: String,
}

pub(crate) async fn list_customers(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
    Query(page): Query<PageQuery>,
) -> Json<CustomerList> {
    let desk = state.desk.read().await;
    Json(CustomerList {
        page: desk
            .customers
            .page(&filter, page.number(), state.config.page_size),
        stats: desk.customers.stats(),
        next_code: desk.customers.next_code(),
    })
}

pub(crate) async fn export_customers(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Response, ApiError> {
    let body = state
        .desk
        .read()
        .await
        .customers
        .export_csv(&filter)
        .map_err(desk_error)?;
    Ok(csv_attachment("customers", body))
}

pub(crate) async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerDraft>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state
        .desk
        .write()
        .await
        .customers
        .create(payload)
        .map_err(desk_error)?;

    state
        .record(
            customer.id,
            EntityKind::Customer,
            DomainEventKind::RecordCreated,
            format!("customer {} {} created", customer.code, customer.name),
            &customer,
        )
        .await;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub(crate) async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerDraft>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .desk
        .write()
        .await
        .customers
        .update(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            customer.id,
            EntityKind::Customer,
            DomainEventKind::RecordUpdated,
            format!("customer {} updated", customer.code),
            &customer,
        )
        .await;
    Ok(Json(customer))
}

pub(crate) async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Customer>, ApiError> {
    confirm.require("deleting a customer").map_err(desk_error)?;
    let customer = state
        .desk
        .write()
        .await
        .customers
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            customer.id,
            EntityKind::Customer,
            DomainEventKind::RecordDeleted,
            format!("customer {} {} deleted", customer.code, customer.name),
            &customer,
        )
        .await;
    Ok(Json(customer))
}
