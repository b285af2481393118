use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountCategory {
    CurrentAssets,
    FixedAssets,
    CashAndEquivalents,
    AccountsReceivable,
    Inventory,
    CurrentLiabilities,
    LongTermLiabilities,
    AccountsPayable,
    OwnerEquity,
    RetainedEarnings,
    OperatingRevenue,
    OtherRevenue,
    OperatingExpenses,
    AdministrativeExpenses,
    FinancialExpenses,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: AccountCategory,
    pub parent_id: Option<Uuid>,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub reference: String,
    pub entries: Vec<TransactionEntry>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub is_posted: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds an unposted transaction whose totals are derived from its entries.
    pub fn from_entries(
        date: NaiveDate,
        description: String,
        reference: String,
        entries: Vec<TransactionEntry>,
        created_by: String,
    ) -> Self {
        let total_debit = entries.iter().map(|entry| entry.debit).sum();
        let total_credit = entries.iter().map(|entry| entry.credit).sum();

        Self {
            id: Uuid::new_v4(),
            date,
            description,
            reference,
            entries,
            total_debit,
            total_credit,
            is_posted: false,
            created_by,
            created_at: Utc::now(),
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankAccountType {
    Checking,
    Savings,
    CreditLine,
    Investment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub account_type: BankAccountType,
    pub currency: String,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankMovementType {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
    Fee,
    Interest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankMovement {
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub reference: String,
    pub movement_type: BankMovementType,
    pub amount: Decimal,
    /// Account balance right after this movement was recorded.
    pub balance: Decimal,
    pub is_reconciled: bool,
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowType {
    Inflow,
    Outflow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowCategory {
    Operating,
    Investing,
    Financing,
}

impl CashFlowCategory {
    pub const ALL: [CashFlowCategory; 3] = [
        CashFlowCategory::Operating,
        CashFlowCategory::Investing,
        CashFlowCategory::Financing,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub category: CashFlowCategory,
    pub flow_type: CashFlowType,
    pub amount: Decimal,
    pub account_id: Option<Uuid>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportLine {
    pub account_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportSection {
    pub accounts: Vec<ReportLine>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub id: Uuid,
    pub date: NaiveDate,
    pub assets: ReportSection,
    pub liabilities: ReportSection,
    pub equity: ReportSection,
    pub total_assets: Decimal,
    pub total_liabilities_and_equity: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub revenue: ReportSection,
    pub expenses: ReportSection,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(debit: i64, credit: i64) -> TransactionEntry {
        TransactionEntry {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            debit: Decimal::from(debit),
            credit: Decimal::from(credit),
            description: String::new(),
        }
    }

    #[test]
    fn totals_come_from_entries() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let balanced = Transaction::from_entries(
            date,
            "Venta de mercancía".into(),
            "FAC-001".into(),
            vec![entry(1000, 0), entry(0, 1000)],
            "admin".into(),
        );
        assert_eq!(balanced.total_debit, Decimal::from(1000));
        assert!(balanced.is_balanced());
        assert!(!balanced.is_posted);

        let lopsided = Transaction::from_entries(
            date,
            "Pago".into(),
            "PAG-001".into(),
            vec![entry(500, 0), entry(0, 400)],
            "admin".into(),
        );
        assert!(!lopsided.is_balanced());
    }
}
