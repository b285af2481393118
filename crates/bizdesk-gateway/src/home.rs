use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
};
use bizdesk_platform::{
    ActivityEntry, FormAccepted, HomeSummary, LoginRequest, RegisterRequest, validate_login,
    validate_registration,
};
use bizdesk_core::{DomainEventKind, EntityKind};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::{desk_error, internal_error};
use crate::state::AppState;

type ApiError = (StatusCode, String);

pub(crate) async fn redirect_home() -> Redirect {
    Redirect::to("/home")
}

pub(crate) async fn home(State(state): State<AppState>) -> Result<Json<HomeSummary>, ApiError> {
    let recent_activity = state
        .events
        .recent(state.config.activity_limit)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(ActivityEntry::from)
        .collect();

    let desk = state.desk.read().await;
    let inventory = desk.catalog.stats();
    Ok(Json(HomeSummary {
        products: inventory.total_products,
        customers: desk.customers.all().len(),
        suppliers: desk.suppliers.all().len(),
        pending_orders: desk.orders.stats().pending_orders,
        inventory_value: inventory.total_value,
        open_alerts: desk.alerts.open_count(),
        recent_activity,
    }))
}

/// History of one record, newest first. Unknown ids answer an empty list.
pub(crate) async fn record_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let mut history: Vec<ActivityEntry> = state
        .events
        .stream(id)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(ActivityEntry::from)
        .collect();
    history.reverse();
    Ok(Json(history))
}

/// Checks the login form. There is no user store, so a valid form is all
/// that is answered.
pub(crate) async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<FormAccepted>, ApiError> {
    validate_login(&payload).map_err(desk_error)?;
    info!("login form accepted for {}", payload.email.trim());
    Ok(Json(FormAccepted {
        accepted: true,
        message: "Login details are valid".to_string(),
    }))
}

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<FormAccepted>, ApiError> {
    validate_registration(&payload).map_err(desk_error)?;
    let email = payload.email.trim();
    state
        .record(
            Uuid::new_v4(),
            EntityKind::User,
            DomainEventKind::RecordCreated,
            format!("registration received for {email}"),
            &json!({
                "first_name": payload.first_name.trim(),
                "last_name": payload.last_name.trim(),
                "email": email,
                "company": payload.company.trim(),
            }),
        )
        .await;
    Ok(Json(FormAccepted {
        accepted: true,
        message: "Registration details are valid".to_string(),
    }))
}
