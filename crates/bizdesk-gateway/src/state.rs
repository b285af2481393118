use std::sync::Arc;

use bizdesk_core::{DomainEvent, DomainEventKind, EntityKind, EventStore};
use bizdesk_crm::CustomerBook;
use bizdesk_finance::{BankBook, CashFlowBook, ChartOfAccounts, Journal};
use bizdesk_inventory::{AlertBoard, ProductCatalog, StockLedger};
use bizdesk_platform::ServiceConfig;
use bizdesk_purchasing::{PurchaseOrderBook, ReceiptBook, SupplierDirectory};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Every book the desk keeps. All of it lives in memory for the life of the
/// process.
#[derive(Debug)]
pub(crate) struct Desk {
    pub chart: ChartOfAccounts,
    pub journal: Journal,
    pub banks: BankBook,
    pub cash_flow: CashFlowBook,
    pub catalog: ProductCatalog,
    pub alerts: AlertBoard,
    pub stock: StockLedger,
    pub suppliers: SupplierDirectory,
    pub orders: PurchaseOrderBook,
    pub receipts: ReceiptBook,
    pub customers: CustomerBook,
}

impl Desk {
    pub fn new(default_currency: &str) -> Self {
        Self {
            chart: ChartOfAccounts::new(),
            journal: Journal::new(),
            banks: BankBook::new(default_currency),
            cash_flow: CashFlowBook::new(),
            catalog: ProductCatalog::new(),
            alerts: AlertBoard::new(),
            stock: StockLedger::new(),
            suppliers: SupplierDirectory::new(),
            orders: PurchaseOrderBook::new(default_currency),
            receipts: ReceiptBook::new(),
            customers: CustomerBook::new(),
        }
    }

    /// Must run after anything that changes product stock or thresholds.
    pub fn refresh_alerts(&mut self) {
        self.alerts.regenerate(&self.catalog);
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub desk: Arc<RwLock<Desk>>,
    pub events: Arc<dyn EventStore>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(config: ServiceConfig, events: Arc<dyn EventStore>) -> Self {
        Self {
            desk: Arc::new(RwLock::new(Desk::new(&config.default_currency))),
            events,
            config: Arc::new(config),
        }
    }

    /// Appends a change to the activity log. A failed append is logged and
    /// never fails the request that caused it.
    pub async fn record<T: Serialize>(
        &self,
        aggregate_id: Uuid,
        entity: EntityKind,
        kind: DomainEventKind,
        summary: impl Into<String>,
        payload: &T,
    ) {
        let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
        let event = DomainEvent::new(aggregate_id, entity, kind, summary, payload);
        let summary = event.summary.clone();

        match self.events.append(aggregate_id, event).await {
            Ok(envelope) => info!(
                "activity #{} on {aggregate_id}: {}",
                envelope.sequence, summary
            ),
            Err(err) => error!("failed to record activity for {aggregate_id}: {err}"),
        }
    }
}
