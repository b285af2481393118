use bizdesk_core::accounting::{CashFlowCategory, CashFlowEntry, CashFlowType};
use bizdesk_core::filter::{DateRange, RecordFilter, option_matches};
use bizdesk_core::models::non_blank;
use bizdesk_core::{DeskError, FormErrors, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowDraft {
    pub date: NaiveDate,
    pub description: String,
    pub category: CashFlowCategory,
    pub flow_type: CashFlowType,
    pub amount: Decimal,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl CashFlowDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("description", &self.description, 3);
        errors.amount("amount", self.amount, Decimal::new(1, 2));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowFilter {
    #[serde(default)]
    pub flow_type: Option<CashFlowType>,
    #[serde(default)]
    pub category: Option<CashFlowCategory>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter<CashFlowEntry> for CashFlowFilter {
    fn matches(&self, entry: &CashFlowEntry) -> bool {
        option_matches(self.flow_type.as_ref(), &entry.flow_type)
            && option_matches(self.category.as_ref(), &entry.category)
            && DateRange::new(self.from, self.to).contains(entry.date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub total_inflows: Decimal,
    pub total_outflows: Decimal,
    pub net_cash_flow: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlow {
    pub category: CashFlowCategory,
    pub inflow: Decimal,
    pub outflow: Decimal,
}

#[derive(Debug, Default)]
pub struct CashFlowBook {
    entries: Vec<CashFlowEntry>,
}

impl CashFlowBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[CashFlowEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&CashFlowEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn create(&mut self, draft: CashFlowDraft) -> Result<CashFlowEntry> {
        draft.validate()?;
        let entry = CashFlowEntry {
            id: Uuid::new_v4(),
            date: draft.date,
            description: draft.description.trim().to_string(),
            category: draft.category,
            flow_type: draft.flow_type,
            amount: draft.amount,
            account_id: draft.account_id,
            reference: non_blank(draft.reference.as_deref())
                .unwrap_or_else(|| format!("CF-{}", Utc::now().timestamp_millis())),
            created_at: Utc::now(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn update(&mut self, id: Uuid, draft: CashFlowDraft) -> Result<CashFlowEntry> {
        draft.validate()?;
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| DeskError::not_found("cash flow entry", id))?;
        entry.date = draft.date;
        entry.description = draft.description.trim().to_string();
        entry.category = draft.category;
        entry.flow_type = draft.flow_type;
        entry.amount = draft.amount;
        entry.account_id = draft.account_id;
        if let Some(reference) = non_blank(draft.reference.as_deref()) {
            entry.reference = reference;
        }
        Ok(entry.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<CashFlowEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| DeskError::not_found("cash flow entry", id))?;
        Ok(self.entries.remove(index))
    }

    pub fn filter(&self, filter: &CashFlowFilter) -> Vec<&CashFlowEntry> {
        filter.apply(&self.entries)
    }
}

pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a CashFlowEntry>) -> CashFlowSummary {
    let mut summary = CashFlowSummary::default();
    for entry in entries {
        match entry.flow_type {
            CashFlowType::Inflow => summary.total_inflows += entry.amount,
            CashFlowType::Outflow => summary.total_outflows += entry.amount,
        }
    }
    summary.net_cash_flow = summary.total_inflows - summary.total_outflows;
    summary
}

/// One row per category, always in operating, investing, financing order.
pub fn by_category<'a>(entries: impl IntoIterator<Item = &'a CashFlowEntry>) -> Vec<CategoryFlow> {
    let mut rows: Vec<CategoryFlow> = CashFlowCategory::ALL
        .iter()
        .map(|category| CategoryFlow {
            category: *category,
            inflow: Decimal::ZERO,
            outflow: Decimal::ZERO,
        })
        .collect();

    for entry in entries {
        if let Some(row) = rows.iter_mut().find(|row| row.category == entry.category) {
            match entry.flow_type {
                CashFlowType::Inflow => row.inflow += entry.amount,
                CashFlowType::Outflow => row.outflow += entry.amount,
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(category: CashFlowCategory, flow_type: CashFlowType, amount: i64, d: u32) -> CashFlowDraft {
        CashFlowDraft {
            date: NaiveDate::from_ymd_opt(2024, 2, d).unwrap(),
            description: "Cobro de facturas".into(),
            category,
            flow_type,
            amount: Decimal::from(amount),
            account_id: None,
            reference: None,
        }
    }

    fn seeded() -> CashFlowBook {
        let mut book = CashFlowBook::new();
        book.create(draft(CashFlowCategory::Operating, CashFlowType::Inflow, 1000, 1))
            .unwrap();
        book.create(draft(CashFlowCategory::Operating, CashFlowType::Outflow, 300, 5))
            .unwrap();
        book.create(draft(CashFlowCategory::Investing, CashFlowType::Outflow, 200, 10))
            .unwrap();
        book.create(draft(CashFlowCategory::Financing, CashFlowType::Inflow, 50, 20))
            .unwrap();
        book
    }

    #[test]
    fn default_reference_and_validation() {
        let mut book = CashFlowBook::new();
        let entry = book
            .create(draft(CashFlowCategory::Operating, CashFlowType::Inflow, 10, 1))
            .unwrap();
        assert!(entry.reference.starts_with("CF-"));

        let mut bad = draft(CashFlowCategory::Operating, CashFlowType::Inflow, 0, 1);
        bad.description = "ab".into();
        let Err(DeskError::Validation(errors)) = book.create(bad) else {
            panic!("expected validation errors");
        };
        assert!(errors.has("amount"));
        assert!(errors.has("description"));
    }

    #[test]
    fn summary_over_filtered_entries() {
        let book = seeded();
        let all = summarize(book.all());
        assert_eq!(all.total_inflows, Decimal::from(1050));
        assert_eq!(all.total_outflows, Decimal::from(500));
        assert_eq!(all.net_cash_flow, Decimal::from(550));

        let operating = book.filter(&CashFlowFilter {
            category: Some(CashFlowCategory::Operating),
            ..CashFlowFilter::default()
        });
        assert_eq!(summarize(operating).net_cash_flow, Decimal::from(700));

        let window = book.filter(&CashFlowFilter {
            from: Some(NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()),
            ..CashFlowFilter::default()
        });
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn breakdown_keeps_every_category() {
        let book = seeded();
        let rows = by_category(book.all());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, CashFlowCategory::Operating);
        assert_eq!(rows[0].inflow, Decimal::from(1000));
        assert_eq!(rows[0].outflow, Decimal::from(300));
        assert_eq!(rows[1].outflow, Decimal::from(200));
        assert_eq!(rows[2].inflow, Decimal::from(50));

        let empty = by_category(Vec::<CashFlowEntry>::new().iter());
        assert!(empty.iter().all(|row| row.inflow.is_zero() && row.outflow.is_zero()));
    }

    #[test]
    fn update_and_delete() {
        let mut book = seeded();
        let id = book.all()[0].id;
        let reference = book.all()[0].reference.clone();
        let updated = book
            .update(id, draft(CashFlowCategory::Financing, CashFlowType::Inflow, 99, 1))
            .unwrap();
        assert_eq!(updated.amount, Decimal::from(99));
        assert_eq!(updated.reference, reference);

        book.delete(id).unwrap();
        assert_eq!(book.all().len(), 3);
        assert!(book.get(id).is_none());
    }
}
