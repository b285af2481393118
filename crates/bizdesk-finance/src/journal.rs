use bizdesk_core::accounting::{Transaction, TransactionEntry};
use bizdesk_core::{DeskError, FormErrors, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::ChartOfAccounts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDraft {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub entries: Vec<EntryDraft>,
    pub created_by: String,
}

impl TransactionDraft {
    pub fn validate(&self, chart: &ChartOfAccounts) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("description", &self.description, 3);
        errors.required("created_by", &self.created_by);
        if self.entries.is_empty() {
            errors.push("entries", "must contain at least one line");
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if chart.get(entry.account_id).is_none() {
                errors.push(&format!("entries[{index}].account_id"), "is not a known account");
            }
            errors.amount(&format!("entries[{index}].debit"), entry.debit, Decimal::ZERO);
            errors.amount(&format!("entries[{index}].credit"), entry.credit, Decimal::ZERO);
        }
        errors.into_result()
    }
}

/// Recorded transactions. Balances on the chart are not touched.
#[derive(Debug, Default)]
pub struct Journal {
    transactions: Vec<Transaction>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|transaction| transaction.id == id)
    }

    pub fn record(&mut self, draft: TransactionDraft, chart: &ChartOfAccounts) -> Result<Transaction> {
        draft.validate(chart)?;

        let reference = draft
            .reference
            .map(|reference| reference.trim().to_string())
            .filter(|reference| !reference.is_empty())
            .unwrap_or_else(|| format!("TRX-{}", Utc::now().timestamp_millis()));
        let entries = draft
            .entries
            .into_iter()
            .map(|entry| TransactionEntry {
                id: Uuid::new_v4(),
                account_id: entry.account_id,
                debit: entry.debit,
                credit: entry.credit,
                description: entry.description.trim().to_string(),
            })
            .collect();

        let transaction = Transaction::from_entries(
            draft.date,
            draft.description.trim().to_string(),
            reference,
            entries,
            draft.created_by.trim().to_string(),
        );
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)
            .ok_or_else(|| DeskError::not_found("transaction", id))?;
        Ok(self.transactions.remove(index))
    }

    pub fn unbalanced(&self) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|transaction| !transaction.is_balanced())
            .collect()
    }
}
