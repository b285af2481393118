use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bizdesk_core::accounting::{
    Account, BalanceSheet, BankAccount, BankMovement, CashFlowEntry, IncomeStatement, Transaction,
};
use bizdesk_core::{DomainEventKind, EntityKind};
use bizdesk_finance::{
    AccountDraft, BankAccountDraft, BankMovementDraft, CashFlowDraft, CashFlowFilter,
    CashFlowSummary, CategoryFlow, MovementFilter, TransactionDraft, balance_sheet, by_category,
    income_statement, summarize,
};
use bizdesk_platform::{BalanceOverride, BalanceSheetQuery, ConfirmQuery, PeriodQuery};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::desk_error;
use crate::state::AppState;

type ApiError = (StatusCode, String);

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AccountSearch {
    #[serde(default)]
    search: Option<String>,
}

pub(crate) async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountSearch>,
) -> Json<Vec<Account>> {
    let desk = state.desk.read().await;
    let accounts = desk
        .chart
        .search(query.search.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    Json(accounts)
}

pub(crate) async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<AccountDraft>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let account = state
        .desk
        .write()
        .await
        .chart
        .create(payload)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::Account,
            DomainEventKind::RecordCreated,
            format!("account {} {} created", account.code, account.name),
            &account,
        )
        .await;
    Ok((StatusCode::CREATED, Json(account)))
}

pub(crate) async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountDraft>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .desk
        .write()
        .await
        .chart
        .update(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::Account,
            DomainEventKind::RecordUpdated,
            format!("account {} updated", account.code),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Account>, ApiError> {
    confirm.require("deleting an account").map_err(desk_error)?;
    let account = state
        .desk
        .write()
        .await
        .chart
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::Account,
            DomainEventKind::RecordDeleted,
            format!("account {} deleted", account.code),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn toggle_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .desk
        .write()
        .await
        .chart
        .toggle_active(id)
        .map_err(desk_error)?;

    let status = if account.is_active { "activated" } else { "deactivated" };
    state
        .record(
            account.id,
            EntityKind::Account,
            DomainEventKind::StatusChanged,
            format!("account {} {status}", account.code),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn set_account_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BalanceOverride>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .desk
        .write()
        .await
        .chart
        .set_balance(id, payload.balance)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::Account,
            DomainEventKind::RecordUpdated,
            format!("account {} balance set to {}", account.code, account.balance),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.desk.read().await.journal.all().to_vec())
}

pub(crate) async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<TransactionDraft>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = {
        let mut guard = state.desk.write().await;
        let desk = &mut *guard;
        desk.journal.record(payload, &desk.chart).map_err(desk_error)?
    };

    state
        .record(
            transaction.id,
            EntityKind::Transaction,
            DomainEventKind::RecordCreated,
            format!("transaction {} recorded", transaction.reference),
            &transaction,
        )
        .await;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub(crate) async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<Transaction>, ApiError> {
    confirm
        .require("deleting a transaction")
        .map_err(desk_error)?;
    let transaction = state
        .desk
        .write()
        .await
        .journal
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            transaction.id,
            EntityKind::Transaction,
            DomainEventKind::RecordDeleted,
            format!("transaction {} deleted", transaction.reference),
            &transaction,
        )
        .await;
    Ok(Json(transaction))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BankOverview {
    accounts: Vec<BankAccount>,
    total_active_balance: Decimal,
}

pub(crate) async fn list_bank_accounts(State(state): State<AppState>) -> Json<BankOverview> {
    let desk = state.desk.read().await;
    Json(BankOverview {
        accounts: desk.banks.accounts().to_vec(),
        total_active_balance: desk.banks.total_active_balance(),
    })
}

pub(crate) async fn create_bank_account(
    State(state): State<AppState>,
    Json(payload): Json<BankAccountDraft>,
) -> Result<(StatusCode, Json<BankAccount>), ApiError> {
    let account = state
        .desk
        .write()
        .await
        .banks
        .create_account(payload)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::BankAccount,
            DomainEventKind::RecordCreated,
            format!("bank account {} - {} created", account.bank_name, account.account_number),
            &account,
        )
        .await;
    Ok((StatusCode::CREATED, Json(account)))
}

pub(crate) async fn update_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankAccountDraft>,
) -> Result<Json<BankAccount>, ApiError> {
    let account = state
        .desk
        .write()
        .await
        .banks
        .update_account(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::BankAccount,
            DomainEventKind::RecordUpdated,
            format!("bank account {} updated", account.account_number),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn delete_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<BankAccount>, ApiError> {
    confirm
        .require("deleting a bank account")
        .map_err(desk_error)?;
    let account = state
        .desk
        .write()
        .await
        .banks
        .delete_account(id)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::BankAccount,
            DomainEventKind::RecordDeleted,
            format!("bank account {} deleted", account.account_number),
            &account,
        )
        .await;
    Ok(Json(account))
}

pub(crate) async fn toggle_bank_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankAccount>, ApiError> {
    let account = state
        .desk
        .write()
        .await
        .banks
        .toggle_account(id)
        .map_err(desk_error)?;

    state
        .record(
            account.id,
            EntityKind::BankAccount,
            DomainEventKind::StatusChanged,
            format!(
                "bank account {} {}",
                account.account_number,
                if account.is_active { "activated" } else { "deactivated" }
            ),
            &account,
        )
        .await;
    Ok(Json(account))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MovementView {
    #[serde(flatten)]
    movement: BankMovement,
    account_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MovementList {
    movements: Vec<MovementView>,
    unreconciled: usize,
}

pub(crate) async fn list_bank_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> Json<MovementList> {
    let desk = state.desk.read().await;
    let movements = desk
        .banks
        .filter_movements(&filter)
        .into_iter()
        .map(|movement| MovementView {
            account_label: desk.banks.account_label(movement.bank_account_id),
            movement: movement.clone(),
        })
        .collect();
    Json(MovementList {
        movements,
        unreconciled: desk.banks.unreconciled_count(&filter),
    })
}

pub(crate) async fn create_bank_movement(
    State(state): State<AppState>,
    Json(payload): Json<BankMovementDraft>,
) -> Result<(StatusCode, Json<BankMovement>), ApiError> {
    let movement = state
        .desk
        .write()
        .await
        .banks
        .create_movement(payload)
        .map_err(desk_error)?;

    state
        .record(
            movement.bank_account_id,
            EntityKind::BankMovement,
            DomainEventKind::RecordCreated,
            format!(
                "bank movement {} of {} recorded, balance now {}",
                movement.reference, movement.amount, movement.balance
            ),
            &movement,
        )
        .await;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub(crate) async fn update_bank_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankMovementDraft>,
) -> Result<Json<BankMovement>, ApiError> {
    let movement = state
        .desk
        .write()
        .await
        .banks
        .update_movement(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            movement.bank_account_id,
            EntityKind::BankMovement,
            DomainEventKind::RecordUpdated,
            format!("bank movement {} updated", movement.reference),
            &movement,
        )
        .await;
    Ok(Json(movement))
}

pub(crate) async fn delete_bank_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<BankMovement>, ApiError> {
    confirm
        .require("deleting a bank movement")
        .map_err(desk_error)?;
    let movement = state
        .desk
        .write()
        .await
        .banks
        .delete_movement(id)
        .map_err(desk_error)?;

    state
        .record(
            movement.bank_account_id,
            EntityKind::BankMovement,
            DomainEventKind::RecordDeleted,
            format!("bank movement {} deleted", movement.reference),
            &movement,
        )
        .await;
    Ok(Json(movement))
}

pub(crate) async fn toggle_reconciliation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BankMovement>, ApiError> {
    let movement = state
        .desk
        .write()
        .await
        .banks
        .toggle_reconciliation(id)
        .map_err(desk_error)?;

    state
        .record(
            movement.bank_account_id,
            EntityKind::BankMovement,
            DomainEventKind::StatusChanged,
            format!(
                "bank movement {} marked {}",
                movement.reference,
                if movement.is_reconciled { "reconciled" } else { "unreconciled" }
            ),
            &movement,
        )
        .await;
    Ok(Json(movement))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CashFlowOverview {
    entries: Vec<CashFlowEntry>,
    summary: CashFlowSummary,
    by_category: Vec<CategoryFlow>,
}

pub(crate) async fn list_cash_flow(
    State(state): State<AppState>,
    Query(filter): Query<CashFlowFilter>,
) -> Json<CashFlowOverview> {
    let desk = state.desk.read().await;
    let entries = desk.cash_flow.filter(&filter);
    Json(CashFlowOverview {
        summary: summarize(entries.iter().copied()),
        by_category: by_category(entries.iter().copied()),
        entries: entries.into_iter().cloned().collect(),
    })
}

pub(crate) async fn create_cash_flow(
    State(state): State<AppState>,
    Json(payload): Json<CashFlowDraft>,
) -> Result<(StatusCode, Json<CashFlowEntry>), ApiError> {
    let entry = state
        .desk
        .write()
        .await
        .cash_flow
        .create(payload)
        .map_err(desk_error)?;

    state
        .record(
            entry.id,
            EntityKind::CashFlowEntry,
            DomainEventKind::RecordCreated,
            format!("cash flow {} of {} recorded", entry.reference, entry.amount),
            &entry,
        )
        .await;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(crate) async fn update_cash_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CashFlowDraft>,
) -> Result<Json<CashFlowEntry>, ApiError> {
    let entry = state
        .desk
        .write()
        .await
        .cash_flow
        .update(id, payload)
        .map_err(desk_error)?;

    state
        .record(
            entry.id,
            EntityKind::CashFlowEntry,
            DomainEventKind::RecordUpdated,
            format!("cash flow {} updated", entry.reference),
            &entry,
        )
        .await;
    Ok(Json(entry))
}

pub(crate) async fn delete_cash_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<Json<CashFlowEntry>, ApiError> {
    confirm
        .require("deleting a cash flow entry")
        .map_err(desk_error)?;
    let entry = state
        .desk
        .write()
        .await
        .cash_flow
        .delete(id)
        .map_err(desk_error)?;

    state
        .record(
            entry.id,
            EntityKind::CashFlowEntry,
            DomainEventKind::RecordDeleted,
            format!("cash flow {} deleted", entry.reference),
            &entry,
        )
        .await;
    Ok(Json(entry))
}

pub(crate) async fn get_balance_sheet(
    State(state): State<AppState>,
    Query(query): Query<BalanceSheetQuery>,
) -> Json<BalanceSheet> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    Json(balance_sheet(&state.desk.read().await.chart, date))
}

pub(crate) async fn get_income_statement(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<IncomeStatement>, ApiError> {
    let statement = income_statement(&state.desk.read().await.chart, query.start, query.end)
        .map_err(desk_error)?;
    Ok(Json(statement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use bizdesk_core::accounting::{
        AccountCategory, AccountType, BankAccountType, BankMovementType, CashFlowCategory,
        CashFlowType,
    };
    use chrono::NaiveDate;

    fn account_draft(code: &str, name: &str, account_type: AccountType) -> AccountDraft {
        AccountDraft {
            code: code.into(),
            name: name.into(),
            account_type,
            category: match account_type {
                AccountType::Asset => AccountCategory::CashAndEquivalents,
                AccountType::Liability => AccountCategory::AccountsPayable,
                AccountType::Equity => AccountCategory::OwnerEquity,
                AccountType::Revenue => AccountCategory::OperatingRevenue,
                AccountType::Expense => AccountCategory::OperatingExpenses,
            },
            parent_id: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn delete_without_confirmation_keeps_the_account() {
        let state = test_state();
        let (status, Json(account)) = create_account(
            State(state.clone()),
            Json(account_draft("1000", "Caja General", AccountType::Asset)),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = delete_account(
            State(state.clone()),
            Path(account.id),
            Query(ConfirmQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(state.desk.read().await.chart.all().len(), 1);

        delete_account(
            State(state.clone()),
            Path(account.id),
            Query(ConfirmQuery { confirm: true }),
        )
        .await
        .unwrap();
        assert!(state.desk.read().await.chart.all().is_empty());
        assert_eq!(state.events.recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_account_code_conflicts() {
        let state = test_state();
        create_account(
            State(state.clone()),
            Json(account_draft("1000", "Caja General", AccountType::Asset)),
        )
        .await
        .unwrap();
        let err = create_account(
            State(state.clone()),
            Json(account_draft("1000", "Otra caja", AccountType::Asset)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn movements_move_the_bank_balance() {
        let state = test_state();
        let (_, Json(account)) = create_bank_account(
            State(state.clone()),
            Json(BankAccountDraft {
                bank_name: "Banco Santander".into(),
                account_name: "Cuenta Corriente Principal".into(),
                account_number: "0049-1234-56".into(),
                account_type: BankAccountType::Checking,
                currency: None,
                balance: Decimal::from(1_000),
                is_active: true,
            }),
        )
        .await
        .unwrap();
        assert_eq!(account.currency, "EUR");

        let (_, Json(movement)) = create_bank_movement(
            State(state.clone()),
            Json(BankMovementDraft {
                bank_account_id: account.id,
                date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                description: "Comisión mantenimiento".into(),
                reference: None,
                movement_type: BankMovementType::Fee,
                amount: Decimal::from(15),
                is_reconciled: false,
                transaction_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(movement.balance, Decimal::from(985));

        let Json(overview) = list_bank_accounts(State(state.clone())).await;
        assert_eq!(overview.total_active_balance, Decimal::from(985));

        let Json(list) = list_bank_movements(State(state.clone()), Query(MovementFilter::default())).await;
        assert_eq!(list.unreconciled, 1);
        assert_eq!(
            list.movements[0].account_label.as_deref(),
            Some("Banco Santander - 0049-1234-56")
        );

        toggle_reconciliation(State(state.clone()), Path(movement.id))
            .await
            .unwrap();
        let Json(list) = list_bank_movements(State(state), Query(MovementFilter::default())).await;
        assert_eq!(list.unreconciled, 0);
    }

    #[tokio::test]
    async fn cash_flow_overview_summarises_filtered_entries() {
        let state = test_state();
        for (flow_type, amount) in [(CashFlowType::Inflow, 5_000), (CashFlowType::Outflow, 1_200)] {
            create_cash_flow(
                State(state.clone()),
                Json(CashFlowDraft {
                    date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                    description: "Movimiento operativo".into(),
                    category: CashFlowCategory::Operating,
                    flow_type,
                    amount: Decimal::from(amount),
                    account_id: None,
                    reference: None,
                }),
            )
            .await
            .unwrap();
        }

        let Json(overview) = list_cash_flow(State(state), Query(CashFlowFilter::default())).await;
        assert_eq!(overview.entries.len(), 2);
        assert_eq!(overview.summary.net_cash_flow, Decimal::from(3_800));
        assert_eq!(overview.by_category.len(), 3);
    }

    #[tokio::test]
    async fn reports_read_the_chart() {
        let state = test_state();
        let (_, Json(cash)) = create_account(
            State(state.clone()),
            Json(account_draft("1000", "Caja General", AccountType::Asset)),
        )
        .await
        .unwrap();
        set_account_balance(
            State(state.clone()),
            Path(cash.id),
            Json(BalanceOverride {
                balance: Decimal::from(2_500),
            }),
        )
        .await
        .unwrap();

        let Json(sheet) = get_balance_sheet(
            State(state.clone()),
            Query(BalanceSheetQuery::default()),
        )
        .await;
        assert_eq!(sheet.total_assets, Decimal::from(2_500));

        let err = get_income_statement(
            State(state),
            Query(PeriodQuery {
                start: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
