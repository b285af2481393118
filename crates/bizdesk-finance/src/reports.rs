use bizdesk_core::accounting::{
    Account, AccountCategory, AccountType, BalanceSheet, IncomeStatement, ReportLine,
    ReportSection,
};
use bizdesk_core::{DeskError, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::accounts::ChartOfAccounts;

/// Expense accounts under this code prefix count as cost of sales.
const COST_OF_SALES_PREFIX: &str = "5000";

fn section(chart: &ChartOfAccounts, account_type: AccountType) -> ReportSection {
    let accounts: Vec<ReportLine> = chart
        .all()
        .iter()
        .filter(|account| account.account_type == account_type)
        .map(report_line)
        .collect();
    let total = accounts.iter().map(|line| line.balance).sum();
    ReportSection { accounts, total }
}

fn report_line(account: &Account) -> ReportLine {
    ReportLine {
        account_id: account.id,
        account_code: account.code.clone(),
        account_name: account.name.clone(),
        balance: account.balance,
    }
}

/// Snapshot of current balances labelled with `date`.
pub fn balance_sheet(chart: &ChartOfAccounts, date: NaiveDate) -> BalanceSheet {
    let assets = section(chart, AccountType::Asset);
    let liabilities = section(chart, AccountType::Liability);
    let equity = section(chart, AccountType::Equity);

    BalanceSheet {
        id: Uuid::new_v4(),
        date,
        total_assets: assets.total,
        total_liabilities_and_equity: liabilities.total + equity.total,
        assets,
        liabilities,
        equity,
        created_at: Utc::now(),
    }
}

pub fn income_statement(
    chart: &ChartOfAccounts,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<IncomeStatement> {
    if period_start > period_end {
        return Err(DeskError::InvalidPeriod {
            start: period_start,
            end: period_end,
        });
    }

    let revenue = section(chart, AccountType::Revenue);
    let expenses = section(chart, AccountType::Expense);
    let cost_of_sales: Decimal = expenses
        .accounts
        .iter()
        .filter(|line| line.account_code.starts_with(COST_OF_SALES_PREFIX))
        .map(|line| line.balance)
        .sum();

    Ok(IncomeStatement {
        id: Uuid::new_v4(),
        period_start,
        period_end,
        gross_profit: revenue.total - cost_of_sales,
        net_profit: revenue.total - expenses.total,
        revenue,
        expenses,
        created_at: Utc::now(),
    })
}

/// Sum of the section lines whose account sits in `category`.
pub fn category_total(
    section: &ReportSection,
    chart: &ChartOfAccounts,
    category: AccountCategory,
) -> Decimal {
    section
        .accounts
        .iter()
        .filter(|line| {
            chart
                .get(line.account_id)
                .is_some_and(|account| account.category == category)
        })
        .map(|line| line.balance)
        .sum()
}
