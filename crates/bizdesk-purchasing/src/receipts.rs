use bizdesk_core::filter::{DateRange, Page, RecordFilter, option_matches, paginate, search_matches};
use bizdesk_core::models::non_blank;
use bizdesk_core::purchasing::{PurchaseOrder, Receipt, ReceiptItem, ReceiptItemStatus, ReceiptStatus};
use bizdesk_core::{DeskError, FormErrors, Result, to_csv};
use bizdesk_inventory::ProductCatalog;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::PurchaseOrderBook;
use crate::suppliers::SupplierDirectory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItemDraft {
    pub product_id: Uuid,
    #[serde(default)]
    pub purchase_order_item_id: Option<Uuid>,
    #[serde(default)]
    pub ordered_quantity: Decimal,
    #[serde(default)]
    pub received_quantity: Decimal,
    #[serde(default)]
    pub rejected_quantity: Decimal,
    #[serde(default)]
    pub damaged_quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub status: ReceiptItemStatus,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptDraft {
    pub receipt_number: String,
    pub purchase_order_id: Uuid,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    pub receipt_date: NaiveDate,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ReceiptStatus,
    #[serde(default)]
    pub received_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub items: Vec<ReceiptItemDraft>,
}

impl ReceiptDraft {
    pub fn validate(
        &self,
        orders: &PurchaseOrderBook,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.required("receipt_number", &self.receipt_number);
        if orders.get(self.purchase_order_id).is_none() {
            errors.push("purchase_order_id", "is not a known purchase order");
        }
        if self
            .supplier_id
            .is_some_and(|supplier_id| suppliers.get(supplier_id).is_none())
        {
            errors.push("supplier_id", "is not a known supplier");
        }
        for (index, item) in self.items.iter().enumerate() {
            let field = |name: &str| format!("items[{index}].{name}");
            if catalog.get(item.product_id).is_none() {
                errors.push(&field("product_id"), "is not a known product");
            }
            errors.quantity(&field("ordered_quantity"), item.ordered_quantity, Decimal::ZERO);
            errors.quantity(&field("received_quantity"), item.received_quantity, Decimal::ZERO);
            errors.quantity(&field("rejected_quantity"), item.rejected_quantity, Decimal::ZERO);
            errors.quantity(&field("damaged_quantity"), item.damaged_quantity, Decimal::ZERO);
            errors.amount(&field("unit_price"), item.unit_price, Decimal::ZERO);
        }
        errors.into_result()
    }
}

/// One draft line per order line, nothing received yet.
pub fn prefill_from_order(order: &PurchaseOrder) -> Vec<ReceiptItemDraft> {
    order
        .items
        .iter()
        .map(|line| ReceiptItemDraft {
            product_id: line.product_id,
            purchase_order_item_id: Some(line.id),
            ordered_quantity: line.quantity,
            received_quantity: Decimal::ZERO,
            rejected_quantity: Decimal::ZERO,
            damaged_quantity: Decimal::ZERO,
            unit_price: line.unit_price,
            status: ReceiptItemStatus::Pending,
            lot_number: None,
            expiration_date: None,
            notes: None,
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptFilter {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<ReceiptStatus>,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter<Receipt> for ReceiptFilter {
    fn matches(&self, receipt: &Receipt) -> bool {
        search_matches(
            self.text.as_deref(),
            &[
                receipt.receipt_number.as_str(),
                receipt.supplier_name.as_str(),
                receipt.notes.as_deref().unwrap_or_default(),
            ],
        ) && option_matches(self.status.as_ref(), &receipt.status)
            && option_matches(self.supplier_id.as_ref(), &receipt.supplier_id)
            && DateRange::new(self.from, self.to).contains(receipt.receipt_date)
    }
}

#[derive(Debug, Default)]
pub struct ReceiptBook {
    receipts: Vec<Receipt>,
}

impl ReceiptBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn get(&self, id: Uuid) -> Option<&Receipt> {
        self.receipts.iter().find(|receipt| receipt.id == id)
    }

    /// Stores the receipt first in the list and books its received
    /// quantities against the purchase order.
    pub fn create(
        &mut self,
        draft: ReceiptDraft,
        orders: &mut PurchaseOrderBook,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) -> Result<Receipt> {
        draft.validate(orders, suppliers, catalog)?;
        let now = Utc::now();
        let mut receipt = Receipt {
            id: Uuid::new_v4(),
            receipt_number: String::new(),
            purchase_order_id: draft.purchase_order_id,
            purchase_order_number: String::new(),
            supplier_id: Uuid::nil(),
            supplier_name: String::new(),
            status: draft.status,
            receipt_date: draft.receipt_date,
            delivery_date: draft.receipt_date,
            received_by: String::new(),
            items: Vec::new(),
            notes: None,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        apply_draft(&mut receipt, draft, orders, suppliers, catalog);

        orders.apply_receipt(receipt.purchase_order_id, &receipt.items)?;
        self.receipts.insert(0, receipt.clone());
        Ok(receipt)
    }

    /// Rewrites the receipt in place. Quantities already booked against the
    /// order are not revisited.
    pub fn update(
        &mut self,
        id: Uuid,
        draft: ReceiptDraft,
        orders: &PurchaseOrderBook,
        suppliers: &SupplierDirectory,
        catalog: &ProductCatalog,
    ) -> Result<Receipt> {
        draft.validate(orders, suppliers, catalog)?;
        let receipt = self
            .receipts
            .iter_mut()
            .find(|receipt| receipt.id == id)
            .ok_or_else(|| DeskError::not_found("receipt", id))?;
        apply_draft(receipt, draft, orders, suppliers, catalog);
        receipt.updated_at = Utc::now();
        Ok(receipt.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Receipt> {
        let index = self
            .receipts
            .iter()
            .position(|receipt| receipt.id == id)
            .ok_or_else(|| DeskError::not_found("receipt", id))?;
        Ok(self.receipts.remove(index))
    }

    pub fn filter(&self, filter: &ReceiptFilter) -> Vec<&Receipt> {
        filter.apply(&self.receipts)
    }

    pub fn page(&self, filter: &ReceiptFilter, page: usize, per_page: usize) -> Page<Receipt> {
        let matching: Vec<Receipt> = self.filter(filter).into_iter().cloned().collect();
        paginate(&matching, page, per_page)
    }

    pub fn export_csv(&self, filter: &ReceiptFilter) -> Result<String> {
        to_csv(self.filter(filter))
    }
}

fn apply_draft(
    receipt: &mut Receipt,
    draft: ReceiptDraft,
    orders: &PurchaseOrderBook,
    suppliers: &SupplierDirectory,
    catalog: &ProductCatalog,
) {
    let order = orders.get(draft.purchase_order_id);
    let supplier_id = draft
        .supplier_id
        .or(order.map(|order| order.supplier_id))
        .unwrap_or_default();

    receipt.receipt_number = draft.receipt_number.trim().to_string();
    receipt.purchase_order_id = draft.purchase_order_id;
    receipt.purchase_order_number = order
        .map(|order| order.order_number.clone())
        .unwrap_or_default();
    receipt.supplier_id = supplier_id;
    receipt.supplier_name = suppliers
        .get(supplier_id)
        .map(|supplier| supplier.name.clone())
        .or(order.map(|order| order.supplier_name.clone()))
        .unwrap_or_default();
    receipt.status = draft.status;
    receipt.receipt_date = draft.receipt_date;
    receipt.delivery_date = draft.delivery_date.unwrap_or(draft.receipt_date);
    receipt.received_by =
        non_blank(draft.received_by.as_deref()).unwrap_or_else(|| "Current user".to_string());
    receipt.notes = non_blank(draft.notes.as_deref());
    receipt.attachments = draft.attachments;
    receipt.items = draft
        .items
        .into_iter()
        .map(|item| {
            let product = catalog.get(item.product_id);
            ReceiptItem {
                id: Uuid::new_v4(),
                purchase_order_item_id: item.purchase_order_item_id,
                product_id: item.product_id,
                product_code: product.map(|product| product.code.clone()).unwrap_or_default(),
                product_name: product.map(|product| product.name.clone()).unwrap_or_default(),
                ordered_quantity: item.ordered_quantity,
                received_quantity: item.received_quantity,
                rejected_quantity: item.rejected_quantity,
                damaged_quantity: item.damaged_quantity,
                unit_price: item.unit_price,
                total_value: item.received_quantity * item.unit_price,
                status: item.status,
                lot_number: non_blank(item.lot_number.as_deref()),
                expiration_date: item.expiration_date,
                notes: non_blank(item.notes.as_deref()),
            }
        })
        .collect();
}
