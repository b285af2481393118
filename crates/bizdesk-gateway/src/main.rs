mod accounting;
mod customers;
mod errors;
mod home;
mod inventory;
mod purchasing;
mod state;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use axum::{
    Router,
    routing::{get, post, put},
};
use bizdesk_eventstore::InMemoryEventStore;
use bizdesk_platform::ServiceConfig;
use tracing::info;

use crate::state::AppState;

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "bizdesk_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let state = AppState::new(config.clone(), Arc::new(InMemoryEventStore::new()));
    let router = router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(home::redirect_home))
        .route("/home", get(home::home))
        .route("/activity/{id}", get(home::record_activity))
        .route("/login", post(home::login))
        .route("/register", post(home::register))
        .merge(accounting_routes())
        .merge(inventory_routes())
        .merge(purchasing_routes())
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/customers/export", get(customers::export_customers))
        .route(
            "/customers/{id}",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .fallback(home::redirect_home)
        .with_state(state)
}

fn accounting_routes() -> Router<AppState> {
    use accounting::*;

    Router::new()
        .route("/accounting/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounting/accounts/{id}",
            put(update_account).delete(delete_account),
        )
        .route("/accounting/accounts/{id}/toggle", post(toggle_account))
        .route("/accounting/accounts/{id}/balance", put(set_account_balance))
        .route(
            "/accounting/transactions",
            get(list_transactions).post(record_transaction),
        )
        .route(
            "/accounting/transactions/{id}",
            axum::routing::delete(delete_transaction),
        )
        .route(
            "/accounting/banks",
            get(list_bank_accounts).post(create_bank_account),
        )
        .route(
            "/accounting/banks/movements",
            get(list_bank_movements).post(create_bank_movement),
        )
        .route(
            "/accounting/banks/movements/{id}",
            put(update_bank_movement).delete(delete_bank_movement),
        )
        .route(
            "/accounting/banks/movements/{id}/reconcile",
            post(toggle_reconciliation),
        )
        .route(
            "/accounting/banks/{id}",
            put(update_bank_account).delete(delete_bank_account),
        )
        .route("/accounting/banks/{id}/toggle", post(toggle_bank_account))
        .route(
            "/accounting/cash-flow",
            get(list_cash_flow).post(create_cash_flow),
        )
        .route(
            "/accounting/cash-flow/{id}",
            put(update_cash_flow).delete(delete_cash_flow),
        )
        .route("/accounting/balances/balance-sheet", get(get_balance_sheet))
        .route(
            "/accounting/balances/income-statement",
            get(get_income_statement),
        )
}

fn inventory_routes() -> Router<AppState> {
    use inventory::*;

    Router::new()
        .route("/inventory/products", get(list_products).post(create_product))
        .route(
            "/inventory/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route("/inventory/alerts", get(list_alerts))
        .route(
            "/inventory/alerts/{alert_id}/acknowledge",
            post(acknowledge_alert),
        )
        .route(
            "/inventory/stock",
            get(list_stock_movements).post(record_stock_movement),
        )
        .route("/inventory/stock/preview", get(preview_stock))
}

fn purchasing_routes() -> Router<AppState> {
    use purchasing::*;

    Router::new()
        .route(
            "/purchasing/suppliers",
            get(list_suppliers).post(create_supplier),
        )
        .route("/purchasing/suppliers/export", get(export_suppliers))
        .route(
            "/purchasing/suppliers/{id}",
            put(update_supplier).delete(delete_supplier),
        )
        .route("/purchasing/suppliers/{id}/toggle", post(toggle_supplier))
        .route("/purchasing/orders", get(list_orders).post(create_order))
        .route("/purchasing/orders/export", get(export_orders))
        .route(
            "/purchasing/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/purchasing/orders/{id}/approve", post(approve_order))
        .route("/purchasing/orders/{id}/cancel", post(cancel_order))
        .route("/purchasing/orders/{id}/duplicate", post(duplicate_order))
        .route(
            "/purchasing/orders/{id}/receipt-items",
            get(receipt_items_for_order),
        )
        .route(
            "/purchasing/receipts",
            get(list_receipts).post(create_receipt),
        )
        .route("/purchasing/receipts/export", get(export_receipts))
        .route(
            "/purchasing/receipts/{id}",
            put(update_receipt).delete(delete_receipt),
        )
}

async fn healthz() -> &'static str {
    "ok"
}
