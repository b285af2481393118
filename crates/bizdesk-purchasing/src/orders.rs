use bizdesk_core::filter::{DateRange, RecordFilter, option_matches, search_matches};
use bizdesk_core::models::{Address, non_blank};
use bizdesk_core::pricing::{OrderTotals, PricedLine};
use bizdesk_core::purchasing::{
    PaymentTerms, PurchaseOrder, PurchaseOrderItem, PurchaseOrderPriority, PurchaseOrderStatus,
    ReceiptItem,
};
use bizdesk_core::{DeskError, FormErrors, Result, to_csv};
use bizdesk_inventory::ProductCatalog;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::suppliers::SupplierDirectory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Decimal,
    /// Falls back to the product's unit cost.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_tax_rate() -> Decimal {
    Decimal::from(21)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    /// Generated when blank.
    #[serde(default)]
    pub order_number: Option<String>,
    pub supplier_id: Uuid,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub required_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub priority: PurchaseOrderPriority,
    pub delivery_address: Address,
    pub items: Vec<OrderItemDraft>,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    /// Falls back to the supplier's terms.
    #[serde(default)]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl PurchaseOrderDraft {
    pub fn validate(&self, suppliers: &SupplierDirectory, catalog: &ProductCatalog) -> Result<()> {
        let mut errors = FormErrors::new();
        if let Some(number) = non_blank(self.order_number.as_deref()) {
            errors.min_len("order_number", &number, 3);
        }
        if suppliers.get(self.supplier_id).is_none() {
            errors.push("supplier_id", "is not a known supplier");
        }
        self.delivery_address
            .validate_into("delivery_address", &mut errors);
        errors.amount("shipping_cost", self.shipping_cost, Decimal::ZERO);

        if self.items.is_empty() {
            errors.push("items", "must contain at least one line");
        }
        let hundred = Decimal::ONE_HUNDRED;
        for (index, item) in self.items.iter().enumerate() {
            let field = |name: &str| format!("items[{index}].{name}");
            if catalog.get(item.product_id).is_none() {
                errors.push(&field("product_id"), "is not a known product");
            }
            errors.quantity(&field("quantity"), item.quantity, Decimal::ONE);
            if let Some(unit_price) = item.unit_price {
                errors.amount(&field("unit_price"), unit_price, Decimal::ZERO);
            }
            errors.range_decimal(&field("discount_percent"), item.discount_percent, Decimal::ZERO, hundred);
            errors.range_decimal(&field("tax_rate"), item.tax_rate, Decimal::ZERO, hundred);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<PurchaseOrderStatus>,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter<PurchaseOrder> for OrderFilter {
    fn matches(&self, order: &PurchaseOrder) -> bool {
        search_matches(
            self.search.as_deref(),
            &[order.order_number.as_str(), order.supplier_name.as_str()],
        ) && option_matches(self.status.as_ref(), &order.status)
            && option_matches(self.supplier_id.as_ref(), &order.supplier_id)
            && DateRange::new(self.from, self.to).contains(order.order_date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub approved_orders: usize,
    pub received_orders: usize,
    pub total_value: Decimal,
}

#[derive(Debug)]
pub struct PurchaseOrderBook {
    orders: Vec<PurchaseOrder>,
    default_currency: String,
}

impl PurchaseOrderBook {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            orders: Vec::new(),
            default_currency: default_currency.into(),
        }
    }

    pub fn all(&self) -> &[PurchaseOrder] {
        &self.orders
    }

    pub fn get(&self, id: Uuid) -> Option<&PurchaseOrder> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// `PO-YYYYMM-NNNN`, numbered after the orders already held.
    pub fn next_order_number(&self, today: NaiveDate) -> String {
        format!("PO-{}-{:04}", today.format("%Y%m"), self.orders.len() + 1)
    }

    pub fn create(
        &mut self,
        draft: PurchaseOrderDraft,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) -> Result<PurchaseOrder> {
        draft.validate(suppliers, catalog)?;
        let today = Utc::now().date_naive();
        let order_number = non_blank(draft.order_number.as_deref())
            .unwrap_or_else(|| self.next_order_number(today));
        let now = Utc::now();

        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            order_number,
            supplier_id: draft.supplier_id,
            supplier_name: String::new(),
            status: draft.status,
            priority: draft.priority,
            order_date: today,
            required_date: None,
            expected_date: None,
            delivery_address: Address::default(),
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            currency: self.default_currency.clone(),
            payment_terms: PaymentTerms::default(),
            notes: None,
            internal_notes: None,
            created_by: String::new(),
            approved_by: None,
            approved_at: None,
            sent_at: None,
            received_at: None,
            created_at: now,
            updated_at: now,
        };
        self.apply_draft(&mut order, draft, suppliers, catalog);
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Replaces the editable fields and recomputes totals. Quantities already
    /// received carry over to lines for the same product.
    pub fn update(
        &mut self,
        id: Uuid,
        draft: PurchaseOrderDraft,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) -> Result<PurchaseOrder> {
        draft.validate(suppliers, catalog)?;
        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        let received: Vec<(Uuid, Decimal)> = order
            .items
            .iter()
            .map(|item| (item.product_id, item.received_quantity))
            .collect();

        let order_number = non_blank(draft.order_number.as_deref());
        self.apply_draft(&mut order, draft, suppliers, catalog);
        if let Some(order_number) = order_number {
            order.order_number = order_number;
        }
        for item in &mut order.items {
            if let Some((_, quantity)) = received.iter().find(|(product, _)| *product == item.product_id) {
                item.received_quantity = *quantity;
                item.pending_quantity = (item.quantity - *quantity).max(Decimal::ZERO);
            }
        }
        order.updated_at = Utc::now();
        self.orders[index] = order.clone();
        Ok(order)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<PurchaseOrder> {
        let index = self.index_of(id)?;
        Ok(self.orders.remove(index))
    }

    pub fn approve(&mut self, id: Uuid, approved_by: &str) -> Result<PurchaseOrder> {
        let order = self.get_mut(id)?;
        if order.status != PurchaseOrderStatus::Draft {
            return Err(DeskError::InvalidTransition {
                entity: "purchase order",
                action: "approve",
                status: order.status.label().to_string(),
            });
        }
        let now = Utc::now();
        order.status = PurchaseOrderStatus::Approved;
        order.approved_by = non_blank(Some(approved_by));
        order.approved_at = Some(now);
        order.updated_at = now;
        Ok(order.clone())
    }

    pub fn cancel(&mut self, id: Uuid) -> Result<PurchaseOrder> {
        let order = self.get_mut(id)?;
        order.status = PurchaseOrderStatus::Cancelled;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    /// Copies an order as a fresh draft dated today, expected in a week, and
    /// places it at the top of the list.
    pub fn duplicate(&mut self, id: Uuid) -> Result<PurchaseOrder> {
        let source = self
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::not_found("purchase order", id))?;
        let today = Utc::now().date_naive();
        let now = Utc::now();

        let mut copy = source;
        copy.id = Uuid::new_v4();
        copy.order_number = self.next_order_number(today);
        copy.status = PurchaseOrderStatus::Draft;
        copy.order_date = today;
        copy.expected_date = today.checked_add_days(Days::new(7));
        copy.approved_by = None;
        copy.approved_at = None;
        copy.sent_at = None;
        copy.received_at = None;
        copy.created_at = now;
        copy.updated_at = now;
        for item in &mut copy.items {
            item.id = Uuid::new_v4();
            item.received_quantity = Decimal::ZERO;
            item.pending_quantity = item.quantity;
        }

        self.orders.insert(0, copy.clone());
        Ok(copy)
    }

    /// Adds received quantities to the matching lines and moves the order to
    /// partially received or received.
    pub fn apply_receipt(&mut self, id: Uuid, received: &[ReceiptItem]) -> Result<PurchaseOrder> {
        let order = self.get_mut(id)?;
        for receipt_item in received {
            if receipt_item.received_quantity <= Decimal::ZERO {
                continue;
            }
            let line = order.items.iter_mut().find(|line| match receipt_item.purchase_order_item_id {
                Some(line_id) => line.id == line_id,
                None => line.product_id == receipt_item.product_id,
            });
            if let Some(line) = line {
                line.received_quantity += receipt_item.received_quantity;
                line.pending_quantity = (line.quantity - line.received_quantity).max(Decimal::ZERO);
            }
        }

        let any_received = order
            .items
            .iter()
            .any(|line| line.received_quantity > Decimal::ZERO);
        let all_received = !order.items.is_empty()
            && order
                .items
                .iter()
                .all(|line| line.received_quantity >= line.quantity);
        let now = Utc::now();
        if all_received {
            order.status = PurchaseOrderStatus::Received;
            order.received_at = Some(now);
        } else if any_received {
            order.status = PurchaseOrderStatus::PartiallyReceived;
        }
        order.updated_at = now;
        Ok(order.clone())
    }

    pub fn filter(&self, filter: &OrderFilter) -> Vec<&PurchaseOrder> {
        filter.apply(&self.orders)
    }

    pub fn stats(&self) -> OrderStats {
        let count = |status: PurchaseOrderStatus| {
            self.orders
                .iter()
                .filter(|order| order.status == status)
                .count()
        };
        OrderStats {
            total_orders: self.orders.len(),
            pending_orders: count(PurchaseOrderStatus::Pending),
            approved_orders: count(PurchaseOrderStatus::Approved),
            received_orders: count(PurchaseOrderStatus::Received),
            total_value: self.orders.iter().map(|order| order.total_amount).sum(),
        }
    }

    pub fn export_csv(&self, filter: &OrderFilter) -> Result<String> {
        to_csv(self.filter(filter))
    }

    fn apply_draft(
        &self,
        order: &mut PurchaseOrder,
        draft: PurchaseOrderDraft,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) {
        let supplier = suppliers.get(draft.supplier_id);

        order.supplier_id = draft.supplier_id;
        order.supplier_name = supplier
            .map(|supplier| supplier.name.clone())
            .unwrap_or_default();
        order.payment_terms = draft
            .payment_terms
            .or(supplier.map(|supplier| supplier.payment_terms))
            .unwrap_or_default();
        order.status = draft.status;
        order.priority = draft.priority;
        if let Some(order_date) = draft.order_date {
            order.order_date = order_date;
        }
        order.expected_date = draft.expected_date;
        order.required_date = draft.required_date;
        order.delivery_address = draft.delivery_address;
        order.shipping_cost = draft.shipping_cost;
        order.currency = non_blank(draft.currency.as_deref())
            .map(|currency| currency.to_ascii_uppercase())
            .unwrap_or_else(|| self.default_currency.clone());
        order.notes = non_blank(draft.notes.as_deref());
        order.internal_notes = non_blank(draft.internal_notes.as_deref());
        order.created_by =
            non_blank(draft.created_by.as_deref()).unwrap_or_else(|| "Current user".to_string());
        order.items = draft
            .items
            .iter()
            .map(|item| build_item(item, catalog))
            .collect();

        let totals = OrderTotals::from_lines(&order.items);
        order.subtotal = totals.subtotal;
        order.discount_amount = totals.discount_amount;
        order.tax_amount = totals.tax_amount;
        order.total_amount = totals.total_amount;
    }

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.orders
            .iter()
            .position(|order| order.id == id)
            .ok_or_else(|| DeskError::not_found("purchase order", id))
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut PurchaseOrder> {
        self.orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or_else(|| DeskError::not_found("purchase order", id))
    }
}

fn build_item(draft: &OrderItemDraft, catalog: &ProductCatalog) -> PurchaseOrderItem {
    let product = catalog.get(draft.product_id);
    let mut item = PurchaseOrderItem {
        id: Uuid::new_v4(),
        product_id: draft.product_id,
        product_code: product.map(|product| product.code.clone()).unwrap_or_default(),
        product_name: product.map(|product| product.name.clone()).unwrap_or_default(),
        description: non_blank(draft.description.as_deref())
            .or_else(|| product.map(|product| product.description.clone()))
            .unwrap_or_default(),
        quantity: draft.quantity,
        unit_price: draft
            .unit_price
            .or(product.map(|product| product.unit_cost))
            .unwrap_or_default(),
        total_price: Decimal::ZERO,
        tax_rate: draft.tax_rate,
        discount_percent: draft.discount_percent,
        received_quantity: Decimal::ZERO,
        pending_quantity: draft.quantity,
        notes: non_blank(draft.notes.as_deref()),
    };
    item.total_price = item.amounts().line_total;
    item
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::suppliers::tests::draft as supplier_draft;
    use bizdesk_core::inventory::{ProductCategory, ProductStatus, UnitOfMeasure};
    use bizdesk_core::purchasing::ReceiptItemStatus;
    use bizdesk_inventory::ProductDraft;

    pub(crate) struct Fixture {
        pub suppliers: SupplierDirectory,
        pub catalog: ProductCatalog,
        pub supplier_id: Uuid,
        pub laptop_id: Uuid,
        pub mouse_id: Uuid,
    }

    fn product(code: &str, name: &str, unit_cost: i64) -> ProductDraft {
        ProductDraft {
            code: code.into(),
            name: name.into(),
            description: format!("{name} de oficina"),
            category: ProductCategory::Electronics,
            unit_of_measure: UnitOfMeasure::Unit,
            unit_cost: Decimal::from(unit_cost),
            unit_price: Decimal::from(unit_cost * 2),
            current_stock: Decimal::from(10),
            min_stock: Decimal::from(2),
            max_stock: Decimal::from(100),
            reorder_point: Decimal::from(5),
            supplier: None,
            location: None,
            barcode: None,
            status: ProductStatus::Active,
        }
    }

    pub(crate) fn fixture() -> Fixture {
        let mut suppliers = SupplierDirectory::new();
        let mut supplier = supplier_draft("PROV001");
        supplier.payment_terms = PaymentTerms::Net60;
        let supplier_id = suppliers.create(supplier).unwrap().id;

        let mut catalog = ProductCatalog::new();
        let laptop_id = catalog.create(product("LAP001", "Laptop", 650)).unwrap().id;
        let mouse_id = catalog.create(product("MOU001", "Ratón", 180)).unwrap().id;

        Fixture {
            suppliers,
            catalog,
            supplier_id,
            laptop_id,
            mouse_id,
        }
    }

    pub(crate) fn order_draft(fixture: &Fixture) -> PurchaseOrderDraft {
        PurchaseOrderDraft {
            order_number: None,
            supplier_id: fixture.supplier_id,
            order_date: None,
            expected_date: None,
            required_date: None,
            status: PurchaseOrderStatus::Draft,
            priority: PurchaseOrderPriority::Normal,
            delivery_address: Address {
                street: "Calle Mayor 1".into(),
                city: "Madrid".into(),
                state: "Madrid".into(),
                postal_code: "28013".into(),
                country: "España".into(),
            },
            items: vec![
                OrderItemDraft {
                    product_id: fixture.laptop_id,
                    description: None,
                    quantity: Decimal::from(3),
                    unit_price: None,
                    discount_percent: Decimal::from(5),
                    tax_rate: default_tax_rate(),
                    notes: None,
                },
                OrderItemDraft {
                    product_id: fixture.mouse_id,
                    description: Some("Ratón inalámbrico".into()),
                    quantity: Decimal::ONE,
                    unit_price: None,
                    discount_percent: Decimal::ZERO,
                    tax_rate: default_tax_rate(),
                    notes: None,
                },
            ],
            shipping_cost: Decimal::from(25),
            currency: None,
            payment_terms: None,
            notes: None,
            internal_notes: None,
            created_by: None,
        }
    }

    #[test]
    fn create_fills_lines_and_totals() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let order = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();

        let today = Utc::now().date_naive();
        assert_eq!(order.order_number, format!("PO-{}-0001", today.format("%Y%m")));
        assert_eq!(order.supplier_name, "TechnoSupply S.L.");
        assert_eq!(order.payment_terms, PaymentTerms::Net60);
        assert_eq!(order.currency, "EUR");
        assert_eq!(order.items[0].product_code, "LAP001");
        assert_eq!(order.items[0].unit_price, Decimal::from(650));
        assert_eq!(order.items[0].total_price, Decimal::new(2241525, 3));
        assert_eq!(order.items[1].description, "Ratón inalámbrico");
        assert_eq!(order.subtotal, Decimal::from(2130));
        assert_eq!(order.tax_amount, Decimal::new(426825, 3));
        assert_eq!(order.total_amount, Decimal::new(2459325, 3));
        assert_eq!(order.shipping_cost, Decimal::from(25));
    }

    #[test]
    fn create_rejects_unknown_references_and_bad_lines() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let mut draft = order_draft(&fixture);
        draft.supplier_id = Uuid::new_v4();
        draft.items[0].product_id = Uuid::new_v4();
        draft.items[1].quantity = Decimal::ZERO;
        draft.items[1].tax_rate = Decimal::from(120);

        let Err(DeskError::Validation(errors)) =
            book.create(draft, &fixture.suppliers, &fixture.catalog)
        else {
            panic!("expected validation errors");
        };
        assert!(errors.has("supplier_id"));
        assert!(errors.has("items[0].product_id"));
        assert!(errors.has("items[1].quantity"));
        assert!(errors.has("items[1].tax_rate"));
        assert!(book.all().is_empty());

        let mut empty = order_draft(&fixture);
        empty.items.clear();
        assert!(book.create(empty, &fixture.suppliers, &fixture.catalog).is_err());
    }

    #[test]
    fn approve_only_from_draft() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let order = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();

        let approved = book.approve(order.id, "Gerente").unwrap();
        assert_eq!(approved.status, PurchaseOrderStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("Gerente"));
        assert!(matches!(
            book.approve(order.id, "Gerente"),
            Err(DeskError::InvalidTransition { .. })
        ));

        assert_eq!(book.cancel(order.id).unwrap().status, PurchaseOrderStatus::Cancelled);
    }

    #[test]
    fn duplicate_is_a_fresh_draft_on_top() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let order = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();
        book.approve(order.id, "Gerente").unwrap();

        let copy = book.duplicate(order.id).unwrap();
        let today = Utc::now().date_naive();
        assert_ne!(copy.id, order.id);
        assert_ne!(copy.order_number, order.order_number);
        assert_eq!(copy.status, PurchaseOrderStatus::Draft);
        assert_eq!(copy.order_date, today);
        assert_eq!(copy.expected_date, today.checked_add_days(Days::new(7)));
        assert_eq!(copy.total_amount, order.total_amount);
        assert_eq!(book.all()[0].id, copy.id);
        assert_eq!(book.all().len(), 2);
    }

    #[test]
    fn receipt_moves_order_to_partial_then_received() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let order = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();

        let receipt_line = |product_id: Uuid, line_id: Option<Uuid>, quantity: i64| ReceiptItem {
            id: Uuid::new_v4(),
            purchase_order_item_id: line_id,
            product_id,
            product_code: String::new(),
            product_name: String::new(),
            ordered_quantity: Decimal::ZERO,
            received_quantity: Decimal::from(quantity),
            rejected_quantity: Decimal::ZERO,
            damaged_quantity: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            total_value: Decimal::ZERO,
            status: ReceiptItemStatus::Received,
            lot_number: None,
            expiration_date: None,
            notes: None,
        };

        let partial = book
            .apply_receipt(order.id, &[receipt_line(fixture.laptop_id, Some(order.items[0].id), 2)])
            .unwrap();
        assert_eq!(partial.status, PurchaseOrderStatus::PartiallyReceived);
        assert_eq!(partial.items[0].pending_quantity, Decimal::ONE);

        let done = book
            .apply_receipt(
                order.id,
                &[
                    receipt_line(fixture.laptop_id, None, 2),
                    receipt_line(fixture.mouse_id, None, 1),
                ],
            )
            .unwrap();
        assert_eq!(done.status, PurchaseOrderStatus::Received);
        assert_eq!(done.items[0].pending_quantity, Decimal::ZERO);
        assert!(done.received_at.is_some());
    }

    #[test]
    fn stats_filters_and_export() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let first = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();
        let mut pending = order_draft(&fixture);
        pending.status = PurchaseOrderStatus::Pending;
        pending.order_number = Some("PO-MANUAL-7".into());
        book.create(pending, &fixture.suppliers, &fixture.catalog)
            .unwrap();
        book.approve(first.id, "Gerente").unwrap();

        let stats = book.stats();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.approved_orders, 1);
        assert_eq!(stats.received_orders, 0);
        assert_eq!(stats.total_value, Decimal::new(4918650, 3));

        let manual = OrderFilter {
            search: Some("manual".into()),
            ..OrderFilter::default()
        };
        assert_eq!(book.filter(&manual).len(), 1);
        let by_supplier = OrderFilter {
            supplier_id: Some(fixture.supplier_id),
            status: Some(PurchaseOrderStatus::Approved),
            ..OrderFilter::default()
        };
        assert_eq!(book.filter(&by_supplier)[0].id, first.id);

        let csv = book.export_csv(&OrderFilter::default()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("\"2459.32\""));
    }

    #[test]
    fn update_recomputes_and_keeps_received() {
        let fixture = fixture();
        let mut book = PurchaseOrderBook::new("EUR");
        let order = book
            .create(order_draft(&fixture), &fixture.suppliers, &fixture.catalog)
            .unwrap();
        book.apply_receipt(
            order.id,
            &[ReceiptItem {
                id: Uuid::new_v4(),
                purchase_order_item_id: None,
                product_id: fixture.laptop_id,
                product_code: String::new(),
                product_name: String::new(),
                ordered_quantity: Decimal::from(3),
                received_quantity: Decimal::ONE,
                rejected_quantity: Decimal::ZERO,
                damaged_quantity: Decimal::ZERO,
                unit_price: Decimal::ZERO,
                total_value: Decimal::ZERO,
                status: ReceiptItemStatus::Received,
                lot_number: None,
                expiration_date: None,
                notes: None,
            }],
        )
        .unwrap();

        let mut edit = order_draft(&fixture);
        edit.items.truncate(1);
        edit.items[0].quantity = Decimal::from(5);
        edit.items[0].unit_price = Some(Decimal::from(600));
        edit.items[0].discount_percent = Decimal::ZERO;
        let updated = book
            .update(order.id, edit, &fixture.suppliers, &fixture.catalog)
            .unwrap();

        assert_eq!(updated.order_number, order.order_number);
        assert_eq!(updated.subtotal, Decimal::from(3000));
        assert_eq!(updated.total_amount, Decimal::from(3630));
        assert_eq!(updated.items[0].received_quantity, Decimal::ONE);
        assert_eq!(updated.items[0].pending_quantity, Decimal::from(4));
    }
}
