use bizdesk_core::{DeskError, DomainEventKind, EntityKind, EventEnvelope};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?confirm=true` on destructive requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmQuery {
    pub fn require(&self, action: &'static str) -> Result<(), DeskError> {
        if self.confirm {
            Ok(())
        } else {
            Err(DeskError::ConfirmationRequired(action))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
}

impl PageQuery {
    pub fn number(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BalanceSheetQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproveOrderRequest {
    #[serde(default)]
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceOverride {
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub sequence: i64,
    pub aggregate_id: Uuid,
    pub entity: EntityKind,
    pub kind: DomainEventKind,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
}

impl From<EventEnvelope> for ActivityEntry {
    fn from(envelope: EventEnvelope) -> Self {
        Self {
            sequence: envelope.sequence,
            aggregate_id: envelope.event.aggregate_id,
            entity: envelope.event.entity,
            kind: envelope.event.kind,
            summary: envelope.event.summary,
            occurred_at: envelope.event.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSummary {
    pub products: usize,
    pub customers: usize,
    pub suppliers: usize,
    pub pending_orders: usize,
    pub inventory_value: Decimal,
    pub open_alerts: usize,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub terms: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Outcome of a login or registration form. No session is issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAccepted {
    pub accepted: bool,
    pub message: String,
}
