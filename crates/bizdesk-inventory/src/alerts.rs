use std::collections::HashSet;

use bizdesk_core::inventory::{AlertSeverity, AlertType, InventoryAlert, Product};
use bizdesk_core::{DeskError, Result};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::products::ProductCatalog;

/// The first rule that fires for a product, if any.
pub fn alert_for(product: &Product) -> Option<InventoryAlert> {
    let stock = product.current_stock;
    let (alert_type, severity, threshold, suffix, message) = if stock.is_zero() {
        (
            AlertType::OutOfStock,
            AlertSeverity::Critical,
            Decimal::ZERO,
            "out",
            format!("Out of stock: {}", product.name),
        )
    } else if stock <= product.min_stock {
        (
            AlertType::LowStock,
            AlertSeverity::High,
            product.min_stock,
            "low",
            format!("Low stock: {} ({} units)", product.name, stock),
        )
    } else if stock <= product.reorder_point {
        (
            AlertType::ReorderPoint,
            AlertSeverity::Medium,
            product.reorder_point,
            "reorder",
            format!("Reorder point reached: {}", product.name),
        )
    } else if stock >= product.max_stock {
        (
            AlertType::Overstock,
            AlertSeverity::Low,
            product.max_stock,
            "over",
            format!("Overstock: {}", product.name),
        )
    } else {
        return None;
    };

    Some(InventoryAlert {
        id: format!("alert_{}_{}", product.id, suffix),
        product_id: product.id,
        product_code: product.code.clone(),
        product_name: product.name.clone(),
        alert_type,
        current_stock: stock,
        threshold,
        severity,
        message,
        acknowledged: false,
        created_at: Utc::now(),
    })
}

/// Alerts derived from the catalog. Acknowledgements are keyed by alert id
/// and outlive regeneration.
#[derive(Debug, Default)]
pub struct AlertBoard {
    alerts: Vec<InventoryAlert>,
    acknowledged: HashSet<String>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[InventoryAlert] {
        &self.alerts
    }

    pub fn regenerate(&mut self, catalog: &ProductCatalog) -> &[InventoryAlert] {
        self.alerts = catalog
            .all()
            .iter()
            .filter_map(alert_for)
            .map(|mut alert| {
                alert.acknowledged = self.acknowledged.contains(&alert.id);
                alert
            })
            .collect();
        &self.alerts
    }

    pub fn acknowledge(&mut self, id: &str) -> Result<InventoryAlert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|alert| alert.id == id)
            .ok_or_else(|| DeskError::not_found("inventory alert", id))?;
        alert.acknowledged = true;
        self.acknowledged.insert(alert.id.clone());
        Ok(alert.clone())
    }

    pub fn open_count(&self) -> usize {
        self.alerts.iter().filter(|alert| !alert.acknowledged).count()
    }
}
