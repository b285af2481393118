pub mod accounting;
pub mod crm;
pub mod error;
pub mod events;
pub mod export;
pub mod filter;
pub mod inventory;
pub mod models;
pub mod pricing;
pub mod purchasing;
pub mod storage;
pub mod validation;

pub use error::{DeskError, Result};
pub use events::{DomainEvent, DomainEventKind, EntityKind};
pub use export::{CsvRecord, to_csv};
pub use filter::{DateRange, Page, RecordFilter, paginate};
pub use models::Address;
pub use pricing::{LineAmounts, OrderTotals, PricedLine};
pub use storage::{EventEnvelope, EventStore};
pub use validation::{FieldError, FormErrors, MAX_AMOUNT, MAX_QUANTITY};
