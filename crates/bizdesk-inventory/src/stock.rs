use bizdesk_core::filter::{DateRange, RecordFilter, option_matches, search_matches};
use bizdesk_core::inventory::{MovementReason, StockMovement, StockMovementType};
use bizdesk_core::models::non_blank;
use bizdesk_core::{DeskError, FormErrors, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::products::ProductCatalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovementDraft {
    pub product_id: Uuid,
    pub movement_type: StockMovementType,
    pub reason: MovementReason,
    pub quantity: Decimal,
    /// Falls back to the product's unit cost.
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Only entries add stock; exits, adjustments and transfers all remove it.
pub fn projected_stock(current: Decimal, movement_type: StockMovementType, quantity: Decimal) -> Decimal {
    match movement_type {
        StockMovementType::Entry => current + quantity,
        StockMovementType::Exit | StockMovementType::Adjustment | StockMovementType::Transfer => {
            current - quantity
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockMovementFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub movement_type: Option<StockMovementType>,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter<StockMovement> for StockMovementFilter {
    fn matches(&self, movement: &StockMovement) -> bool {
        search_matches(
            self.search.as_deref(),
            &[
                movement.product_code.as_str(),
                movement.product_name.as_str(),
                movement.reference.as_deref().unwrap_or_default(),
                movement.notes.as_deref().unwrap_or_default(),
            ],
        ) && option_matches(self.movement_type.as_ref(), &movement.movement_type)
            && option_matches(self.product_id.as_ref(), &movement.product_id)
            && DateRange::new(self.from, self.to).contains(movement.created_at.date_naive())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStats {
    pub total_movements: usize,
    pub entries_value: Decimal,
    pub exits_value: Decimal,
    pub net_value: Decimal,
}

/// Movement history, newest first.
#[derive(Debug, Default)]
pub struct StockLedger {
    movements: Vec<StockMovement>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[StockMovement] {
        &self.movements
    }

    pub fn record(
        &mut self,
        catalog: &mut ProductCatalog,
        draft: StockMovementDraft,
    ) -> Result<StockMovement> {
        let mut errors = FormErrors::new();
        errors.quantity("quantity", draft.quantity, Decimal::new(1, 2));
        if let Some(unit_cost) = draft.unit_cost {
            errors.amount("unit_cost", unit_cost, Decimal::ZERO);
        }
        if catalog.get(draft.product_id).is_none() {
            errors.push("product_id", "is not a known product");
        }
        errors.into_result()?;

        let product = catalog.get_mut(draft.product_id)?;
        let unit_cost = draft.unit_cost.unwrap_or(product.unit_cost);
        let previous_stock = product.current_stock;
        let new_stock = projected_stock(previous_stock, draft.movement_type, draft.quantity);
        let now = Utc::now();

        product.current_stock = new_stock;
        product.updated_at = now;

        let movement = StockMovement {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            movement_type: draft.movement_type,
            reason: draft.reason,
            quantity: draft.quantity,
            unit_cost,
            total_cost: draft.quantity * unit_cost,
            previous_stock,
            new_stock,
            reference: non_blank(draft.reference.as_deref()),
            notes: non_blank(draft.notes.as_deref()),
            user_id: non_blank(draft.user_id.as_deref()).unwrap_or_else(|| "1".to_string()),
            user_name: non_blank(draft.user_name.as_deref())
                .unwrap_or_else(|| "Current user".to_string()),
            created_at: now,
        };
        self.movements.insert(0, movement.clone());
        Ok(movement)
    }

    pub fn filter(&self, filter: &StockMovementFilter) -> Vec<&StockMovement> {
        filter.apply(&self.movements)
    }

    pub fn stats(&self) -> StockStats {
        let value_of = |kind: StockMovementType| -> Decimal {
            self.movements
                .iter()
                .filter(|movement| movement.movement_type == kind)
                .map(|movement| movement.total_cost)
                .sum()
        };
        let entries_value = value_of(StockMovementType::Entry);
        let exits_value = value_of(StockMovementType::Exit);

        StockStats {
            total_movements: self.movements.len(),
            entries_value,
            exits_value,
            net_value: entries_value - exits_value,
        }
    }

    /// Resulting stock for a product if the movement were recorded now.
    pub fn preview(
        catalog: &ProductCatalog,
        product_id: Uuid,
        movement_type: StockMovementType,
        quantity: Decimal,
    ) -> Result<Decimal> {
        let product = catalog
            .get(product_id)
            .ok_or_else(|| DeskError::not_found("product", product_id))?;
        Ok(projected_stock(product.current_stock, movement_type, quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::tests::draft;
    use proptest::prelude::*;

    fn movement(product_id: Uuid, kind: StockMovementType, quantity: i64) -> StockMovementDraft {
        StockMovementDraft {
            product_id,
            movement_type: kind,
            reason: MovementReason::Purchase,
            quantity: Decimal::from(quantity),
            unit_cost: None,
            reference: Some("FAC-2024-001".into()),
            notes: None,
            user_id: None,
            user_name: None,
        }
    }

    #[test]
    fn entry_adds_and_exit_subtracts() {
        let mut catalog = ProductCatalog::new();
        let product = catalog.create(draft("LAP001", 10, 2, 3, 50)).unwrap();
        let mut ledger = StockLedger::new();

        let entry = ledger
            .record(&mut catalog, movement(product.id, StockMovementType::Entry, 5))
            .unwrap();
        assert_eq!(entry.previous_stock, Decimal::from(10));
        assert_eq!(entry.new_stock, Decimal::from(15));
        assert_eq!(entry.unit_cost, Decimal::from(10));
        assert_eq!(entry.total_cost, Decimal::from(50));

        let exit = ledger
            .record(&mut catalog, movement(product.id, StockMovementType::Exit, 3))
            .unwrap();
        assert_eq!(exit.new_stock, Decimal::from(12));

        ledger
            .record(&mut catalog, movement(product.id, StockMovementType::Adjustment, 2))
            .unwrap();
        assert_eq!(catalog.get(product.id).unwrap().current_stock, Decimal::from(10));
        assert_eq!(ledger.all()[0].movement_type, StockMovementType::Adjustment);
        assert_eq!(ledger.all()[2].movement_type, StockMovementType::Entry);
    }

    #[test]
    fn stock_may_go_negative() {
        let mut catalog = ProductCatalog::new();
        let product = catalog.create(draft("LAP001", 1, 2, 3, 50)).unwrap();
        let mut ledger = StockLedger::new();
        let exit = ledger
            .record(&mut catalog, movement(product.id, StockMovementType::Exit, 4))
            .unwrap();
        assert_eq!(exit.new_stock, Decimal::from(-3));
    }

    #[test]
    fn rejects_unknown_product_and_zero_quantity() {
        let mut catalog = ProductCatalog::new();
        let mut ledger = StockLedger::new();
        let Err(DeskError::Validation(errors)) = ledger.record(
            &mut catalog,
            movement(Uuid::new_v4(), StockMovementType::Entry, 0),
        ) else {
            panic!("expected validation errors");
        };
        assert!(errors.has("product_id"));
        assert!(errors.has("quantity"));
        assert!(ledger.all().is_empty());
    }

    #[test]
    fn stats_and_filters() {
        let mut catalog = ProductCatalog::new();
        let laptop = catalog.create(draft("LAP001", 10, 2, 3, 50)).unwrap();
        let mouse = catalog.create(draft("MOU001", 10, 2, 3, 50)).unwrap();
        let mut ledger = StockLedger::new();

        let mut priced = movement(laptop.id, StockMovementType::Entry, 4);
        priced.unit_cost = Some(Decimal::from(25));
        ledger.record(&mut catalog, priced).unwrap();
        let mut sale = movement(mouse.id, StockMovementType::Exit, 2);
        sale.reference = None;
        sale.notes = Some("Venta mostrador".into());
        ledger.record(&mut catalog, sale).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.total_movements, 2);
        assert_eq!(stats.entries_value, Decimal::from(100));
        assert_eq!(stats.exits_value, Decimal::from(20));
        assert_eq!(stats.net_value, Decimal::from(80));

        let by_note = StockMovementFilter {
            search: Some("mostrador".into()),
            ..StockMovementFilter::default()
        };
        assert_eq!(ledger.filter(&by_note).len(), 1);

        let by_product = StockMovementFilter {
            product_id: Some(laptop.id),
            ..StockMovementFilter::default()
        };
        assert_eq!(ledger.filter(&by_product)[0].product_code, "LAP001");

        let today = Utc::now().date_naive();
        let today_only = StockMovementFilter {
            from: Some(today),
            to: Some(today),
            ..StockMovementFilter::default()
        };
        assert_eq!(ledger.filter(&today_only).len(), 2);
    }

    #[test]
    fn preview_does_not_touch_catalog() {
        let mut catalog = ProductCatalog::new();
        let product = catalog.create(draft("LAP001", 10, 2, 3, 50)).unwrap();
        let preview =
            StockLedger::preview(&catalog, product.id, StockMovementType::Transfer, Decimal::from(4))
                .unwrap();
        assert_eq!(preview, Decimal::from(6));
        assert_eq!(catalog.get(product.id).unwrap().current_stock, Decimal::from(10));
    }

    proptest! {
        #[test]
        fn entry_then_exit_restores_stock(start in 0i64..100_000, quantity in 1i64..100_000) {
            let start = Decimal::from(start);
            let quantity = Decimal::from(quantity);
            let after_entry = projected_stock(start, StockMovementType::Entry, quantity);
            prop_assert_eq!(projected_stock(after_entry, StockMovementType::Exit, quantity), start);
        }
    }
}
