use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Address;
use crate::pricing::PricedLine;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierStatus {
    Active,
    Inactive,
    Blocked,
}

impl SupplierStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Blocked => "Blocked",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierType {
    Goods,
    Services,
    Both,
}

impl SupplierType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Goods => "Goods",
            Self::Services => "Services",
            Self::Both => "Goods and services",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    Immediate,
    Net15,
    #[default]
    Net30,
    Net45,
    Net60,
    Net90,
}

impl PaymentTerms {
    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Net15 => "15 days",
            Self::Net30 => "30 days",
            Self::Net45 => "45 days",
            Self::Net60 => "60 days",
            Self::Net90 => "90 days",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Sent,
    PartiallyReceived,
    Received,
    Cancelled,
    Closed,
}

impl PurchaseOrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Sent => "Sent",
            Self::PartiallyReceived => "Partially received",
            Self::Received => "Received",
            Self::Cancelled => "Cancelled",
            Self::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl PurchaseOrderPriority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Partial,
    Complete,
    Cancelled,
}

impl ReceiptStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Partial => "Partial",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptItemStatus {
    Pending,
    #[default]
    Received,
    Rejected,
    Damaged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierBankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub routing_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub legal_name: String,
    pub supplier_type: SupplierType,
    pub status: SupplierStatus,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub contact_person: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: Address,
    pub payment_terms: PaymentTerms,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    /// One to five stars.
    pub rating: u8,
    pub notes: Option<String>,
    pub categories: Vec<String>,
    pub bank_account: Option<SupplierBankAccount>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Line total after discount and tax.
    pub total_price: Decimal,
    pub tax_rate: Decimal,
    pub discount_percent: Decimal,
    pub received_quantity: Decimal,
    pub pending_quantity: Decimal,
    pub notes: Option<String>,
}

impl PricedLine for PurchaseOrderItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub order_number: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub status: PurchaseOrderStatus,
    pub priority: PurchaseOrderPriority,
    pub order_date: NaiveDate,
    pub required_date: Option<NaiveDate>,
    pub expected_date: Option<NaiveDate>,
    pub delivery_address: Address,
    pub items: Vec<PurchaseOrderItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_terms: PaymentTerms,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: Uuid,
    pub purchase_order_item_id: Option<Uuid>,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub ordered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub rejected_quantity: Decimal,
    pub damaged_quantity: Decimal,
    pub unit_price: Decimal,
    pub total_value: Decimal,
    pub status: ReceiptItemStatus,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub receipt_number: String,
    pub purchase_order_id: Uuid,
    pub purchase_order_number: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub status: ReceiptStatus,
    pub receipt_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub received_by: String,
    pub items: Vec<ReceiptItem>,
    pub notes: Option<String>,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
