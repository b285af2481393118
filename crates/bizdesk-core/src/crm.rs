use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Address;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Prospect,
}

impl CustomerStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Suspended => "Suspended",
            Self::Prospect => "Prospect",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    #[default]
    Individual,
    Business,
    Corporate,
}

impl CustomerType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Business => "Business",
            Self::Corporate => "Corporate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerPriority {
    Low,
    #[default]
    Normal,
    High,
    Vip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Check,
    Paypal,
    Cryptocurrency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    pub newsletter: bool,
    pub promotions: bool,
    pub language: String,
    pub currency: String,
}

impl Default for CustomerPreferences {
    fn default() -> Self {
        Self {
            newsletter: true,
            promotions: true,
            language: "es".to_string(),
            currency: "EUR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub legal_name: Option<String>,
    pub customer_type: CustomerType,
    pub status: CustomerStatus,
    pub priority: CustomerPriority,
    pub tax_id: Option<String>,
    pub email: String,
    pub phone: String,
    pub website: Option<String>,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Address,
    pub billing_address: Option<Address>,
    pub payment_methods: Vec<PaymentMethod>,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    pub total_purchases: Decimal,
    pub last_purchase_date: Option<NaiveDate>,
    pub registration_date: DateTime<Utc>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub sales_representative: Option<String>,
    pub discount_percentage: Decimal,
    pub is_active: bool,
    pub preferences: CustomerPreferences,
    pub loyalty_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleOrderStatus {
    #[default]
    Draft,
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub tax_rate: Decimal,
    pub discount_percent: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub status: SaleOrderStatus,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub shipping_address: Address,
    pub items: Vec<SaleOrderItem>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub sales_representative: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
