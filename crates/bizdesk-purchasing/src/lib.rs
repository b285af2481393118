pub mod orders;
pub mod receipts;
pub mod suppliers;

pub use orders::{OrderFilter, OrderItemDraft, OrderStats, PurchaseOrderBook, PurchaseOrderDraft};
pub use receipts::{ReceiptBook, ReceiptDraft, ReceiptFilter, ReceiptItemDraft, prefill_from_order};
pub use suppliers::{SupplierDirectory, SupplierDraft, SupplierFilter, SupplierStats};
