pub mod accounts;
pub mod banks;
pub mod cash_flow;
pub mod journal;
pub mod reports;

pub use accounts::{AccountDraft, ChartOfAccounts};
pub use banks::{BankAccountDraft, BankBook, BankMovementDraft, MovementFilter};
pub use cash_flow::{
    CashFlowBook, CashFlowDraft, CashFlowFilter, CashFlowSummary, CategoryFlow, by_category, summarize,
};
pub use journal::{EntryDraft, Journal, TransactionDraft};
pub use reports::{balance_sheet, category_total, income_statement};

pub(crate) fn default_true() -> bool {
    true
}
