use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Account,
    Transaction,
    BankAccount,
    BankMovement,
    CashFlowEntry,
    Product,
    StockMovement,
    InventoryAlert,
    Supplier,
    PurchaseOrder,
    Receipt,
    Customer,
    User,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEventKind {
    RecordCreated,
    RecordUpdated,
    RecordDeleted,
    StatusChanged,
    StockMoved,
    GoodsReceived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub entity: EntityKind,
    pub kind: DomainEventKind,
    pub occurred_at: DateTime<Utc>,
    /// Short human readable line shown in the activity feed.
    pub summary: String,
    pub payload: serde_json::Value,
}

impl DomainEvent {
    pub fn new(
        aggregate_id: Uuid,
        entity: EntityKind,
        kind: DomainEventKind,
        summary: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_id,
            entity,
            kind,
            occurred_at: Utc::now(),
            summary: summary.into(),
            payload,
        }
    }
}
