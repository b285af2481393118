use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::Decimal;

use crate::crm::Customer;
use crate::error::Result;
use crate::purchasing::{PurchaseOrder, Receipt, Supplier};

/// A record that can be written as one CSV row.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

/// Header row plus one row per record, every field quoted.
pub fn to_csv<'a, T, I>(records: I) -> Result<String>
where
    T: CsvRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(T::HEADERS)?;
    for record in records {
        writer.write_record(record.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Always two decimals, so `15` is written as `15.00`.
fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

impl CsvRecord for Customer {
    const HEADERS: &'static [&'static str] = &[
        "Code",
        "Name",
        "Type",
        "Status",
        "Email",
        "Phone",
        "Credit limit",
        "Balance",
        "Total purchases",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.customer_type.label().to_string(),
            self.status.label().to_string(),
            self.email.clone(),
            self.phone.clone(),
            money(self.credit_limit),
            money(self.current_balance),
            money(self.total_purchases),
        ]
    }
}

impl CsvRecord for Supplier {
    const HEADERS: &'static [&'static str] = &[
        "Code",
        "Name",
        "Type",
        "Status",
        "Email",
        "Phone",
        "Contact",
        "Payment terms",
        "Credit limit",
        "Balance",
        "Rating",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.supplier_type.label().to_string(),
            self.status.label().to_string(),
            self.email.clone(),
            self.phone.clone(),
            self.contact_person.clone(),
            self.payment_terms.label().to_string(),
            money(self.credit_limit),
            money(self.current_balance),
            self.rating.to_string(),
        ]
    }
}

impl CsvRecord for PurchaseOrder {
    const HEADERS: &'static [&'static str] = &[
        "Number",
        "Supplier",
        "Order date",
        "Expected date",
        "Status",
        "Priority",
        "Total",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.order_number.clone(),
            self.supplier_name.clone(),
            self.order_date.to_string(),
            self.expected_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            self.status.label().to_string(),
            self.priority.label().to_string(),
            money(self.total_amount),
        ]
    }
}

impl CsvRecord for Receipt {
    const HEADERS: &'static [&'static str] = &[
        "Number",
        "Purchase order",
        "Supplier",
        "Date",
        "Status",
        "Notes",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.receipt_number.clone(),
            self.purchase_order_number.clone(),
            self.supplier_name.clone(),
            self.receipt_date.to_string(),
            self.status.label().to_string(),
            self.notes.clone().unwrap_or_default(),
        ]
    }
}
