pub mod alerts;
pub mod products;
pub mod stock;

pub use alerts::{AlertBoard, alert_for};
pub use products::{
    InventoryStats, ProductCatalog, ProductDraft, ProductFilter, StockFilter, StockLevel,
};
pub use stock::{StockLedger, StockMovementDraft, StockMovementFilter, StockStats, projected_stock};
