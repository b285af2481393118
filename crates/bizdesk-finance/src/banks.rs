use bizdesk_core::accounting::{BankAccount, BankAccountType, BankMovement, BankMovementType};
use bizdesk_core::filter::{DateRange, RecordFilter, option_matches};
use bizdesk_core::models::non_blank;
use bizdesk_core::{DeskError, FormErrors, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::default_true;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccountDraft {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub account_type: BankAccountType,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl BankAccountDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("bank_name", &self.bank_name, 3);
        errors.min_len("account_name", &self.account_name, 3);
        errors.digits_or_dash("account_number", &self.account_number);
        if let Some(currency) = &self.currency {
            errors.required("currency", currency);
        }
        errors.amount("balance", self.balance, Decimal::ZERO);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankMovementDraft {
    pub bank_account_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub movement_type: BankMovementType,
    pub amount: Decimal,
    #[serde(default)]
    pub is_reconciled: bool,
    #[serde(default)]
    pub transaction_id: Option<Uuid>,
}

impl BankMovementDraft {
    fn validate_into(&self, errors: &mut FormErrors) {
        errors.min_len("description", &self.description, 3);
        errors.amount("amount", self.amount, Decimal::new(1, 2));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    #[serde(default)]
    pub bank_account_id: Option<Uuid>,
    #[serde(default)]
    pub movement_type: Option<BankMovementType>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RecordFilter<BankMovement> for MovementFilter {
    fn matches(&self, movement: &BankMovement) -> bool {
        option_matches(self.bank_account_id.as_ref(), &movement.bank_account_id)
            && option_matches(self.movement_type.as_ref(), &movement.movement_type)
            && DateRange::new(self.from, self.to).contains(movement.date)
    }
}

/// Signed effect of a movement on its account balance.
pub fn balance_effect(movement_type: BankMovementType, amount: Decimal) -> Decimal {
    match movement_type {
        BankMovementType::Deposit | BankMovementType::TransferIn | BankMovementType::Interest => {
            amount
        }
        BankMovementType::Withdrawal | BankMovementType::TransferOut | BankMovementType::Fee => {
            -amount
        }
    }
}

#[derive(Debug)]
pub struct BankBook {
    accounts: Vec<BankAccount>,
    movements: Vec<BankMovement>,
    default_currency: String,
}

impl BankBook {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            accounts: Vec::new(),
            movements: Vec::new(),
            default_currency: default_currency.into(),
        }
    }

    pub fn accounts(&self) -> &[BankAccount] {
        &self.accounts
    }

    pub fn movements(&self) -> &[BankMovement] {
        &self.movements
    }

    pub fn account(&self, id: Uuid) -> Option<&BankAccount> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn movement(&self, id: Uuid) -> Option<&BankMovement> {
        self.movements.iter().find(|movement| movement.id == id)
    }

    pub fn create_account(&mut self, draft: BankAccountDraft) -> Result<BankAccount> {
        draft.validate()?;
        let now = Utc::now();
        let account = BankAccount {
            id: Uuid::new_v4(),
            bank_name: draft.bank_name.trim().to_string(),
            account_name: draft.account_name.trim().to_string(),
            account_number: draft.account_number.trim().to_string(),
            account_type: draft.account_type,
            currency: self.currency_or_default(draft.currency.as_deref()),
            balance: draft.balance,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// The submitted balance replaces the stored one.
    pub fn update_account(&mut self, id: Uuid, draft: BankAccountDraft) -> Result<BankAccount> {
        draft.validate()?;
        let currency = self.currency_or_default(draft.currency.as_deref());
        let account = self.account_mut(id)?;
        account.bank_name = draft.bank_name.trim().to_string();
        account.account_name = draft.account_name.trim().to_string();
        account.account_number = draft.account_number.trim().to_string();
        account.account_type = draft.account_type;
        account.currency = currency;
        account.balance = draft.balance;
        account.is_active = draft.is_active;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    /// Movements of the account are left in place.
    pub fn delete_account(&mut self, id: Uuid) -> Result<BankAccount> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("bank account", id))?;
        Ok(self.accounts.remove(index))
    }

    pub fn toggle_account(&mut self, id: Uuid) -> Result<BankAccount> {
        let account = self.account_mut(id)?;
        account.is_active = !account.is_active;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    pub fn create_movement(&mut self, draft: BankMovementDraft) -> Result<BankMovement> {
        let mut errors = FormErrors::new();
        draft.validate_into(&mut errors);
        if self.account(draft.bank_account_id).is_none() {
            errors.push("bank_account_id", "is not a known bank account");
        }
        errors.into_result()?;

        let effect = balance_effect(draft.movement_type, draft.amount);
        let account = self.account_mut(draft.bank_account_id)?;
        account.balance = account.balance.checked_add(effect).ok_or_else(|| {
            let mut errors = FormErrors::new();
            errors.push("amount", "would overflow the account balance");
            DeskError::Validation(errors)
        })?;
        account.updated_at = Utc::now();
        let running_balance = account.balance;

        let movement = BankMovement {
            id: Uuid::new_v4(),
            bank_account_id: draft.bank_account_id,
            date: draft.date,
            description: draft.description.trim().to_string(),
            reference: non_blank(draft.reference.as_deref())
                .unwrap_or_else(|| format!("MOV-{}", Utc::now().timestamp_millis())),
            movement_type: draft.movement_type,
            amount: draft.amount,
            balance: running_balance,
            is_reconciled: draft.is_reconciled,
            transaction_id: draft.transaction_id,
            created_at: Utc::now(),
        };
        self.movements.push(movement.clone());
        Ok(movement)
    }

    /// Rewrites the movement only. Neither the account balance nor the stored
    /// running balance is recalculated.
    pub fn update_movement(&mut self, id: Uuid, draft: BankMovementDraft) -> Result<BankMovement> {
        let mut errors = FormErrors::new();
        draft.validate_into(&mut errors);
        errors.into_result()?;

        let movement = self
            .movements
            .iter_mut()
            .find(|movement| movement.id == id)
            .ok_or_else(|| DeskError::not_found("bank movement", id))?;
        movement.date = draft.date;
        movement.description = draft.description.trim().to_string();
        movement.reference = non_blank(draft.reference.as_deref()).unwrap_or_default();
        movement.movement_type = draft.movement_type;
        movement.amount = draft.amount;
        movement.is_reconciled = draft.is_reconciled;
        Ok(movement.clone())
    }

    /// The account balance is not reverted.
    pub fn delete_movement(&mut self, id: Uuid) -> Result<BankMovement> {
        let index = self
            .movements
            .iter()
            .position(|movement| movement.id == id)
            .ok_or_else(|| DeskError::not_found("bank movement", id))?;
        Ok(self.movements.remove(index))
    }

    pub fn toggle_reconciliation(&mut self, id: Uuid) -> Result<BankMovement> {
        let movement = self
            .movements
            .iter_mut()
            .find(|movement| movement.id == id)
            .ok_or_else(|| DeskError::not_found("bank movement", id))?;
        movement.is_reconciled = !movement.is_reconciled;
        Ok(movement.clone())
    }

    pub fn filter_movements(&self, filter: &MovementFilter) -> Vec<&BankMovement> {
        filter.apply(&self.movements)
    }

    pub fn total_active_balance(&self) -> Decimal {
        self.accounts
            .iter()
            .filter(|account| account.is_active)
            .map(|account| account.balance)
            .sum()
    }

    pub fn unreconciled_count(&self, filter: &MovementFilter) -> usize {
        self.filter_movements(filter)
            .into_iter()
            .filter(|movement| !movement.is_reconciled)
            .count()
    }

    /// `"<bank> - <number>"`, or `None` for an unknown account.
    pub fn account_label(&self, id: Uuid) -> Option<String> {
        self.account(id)
            .map(|account| format!("{} - {}", account.bank_name, account.account_number))
    }

    fn account_mut(&mut self, id: Uuid) -> Result<&mut BankAccount> {
        self.accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("bank account", id))
    }

    fn currency_or_default(&self, currency: Option<&str>) -> String {
        non_blank(currency)
            .map(|currency| currency.to_ascii_uppercase())
            .unwrap_or_else(|| self.default_currency.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn account_draft(balance: i64) -> BankAccountDraft {
        BankAccountDraft {
            bank_name: "Bancolombia".into(),
            account_name: "Cuenta Corriente Principal".into(),
            account_number: "123-456789-01".into(),
            account_type: BankAccountType::Checking,
            currency: None,
            balance: Decimal::from(balance),
            is_active: true,
        }
    }

    fn movement(account: Uuid, kind: BankMovementType, amount: i64, date: NaiveDate) -> BankMovementDraft {
        BankMovementDraft {
            bank_account_id: account,
            date,
            description: "Movimiento de prueba".into(),
            reference: None,
            movement_type: kind,
            amount: Decimal::from(amount),
            is_reconciled: false,
            transaction_id: None,
        }
    }

    #[test]
    fn account_takes_default_currency() {
        let mut book = BankBook::new("EUR");
        let account = book.create_account(account_draft(1000)).unwrap();
        assert_eq!(account.currency, "EUR");
        assert_eq!(
            book.account_label(account.id).as_deref(),
            Some("Bancolombia - 123-456789-01")
        );
        assert!(book.account_label(Uuid::new_v4()).is_none());
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let mut book = BankBook::new("EUR");
        let account = book.create_account(account_draft(1000)).unwrap();

        let mut huge = movement(account.id, BankMovementType::Deposit, 0, day(2));
        huge.amount = Decimal::MAX;
        assert!(matches!(
            book.create_movement(huge),
            Err(DeskError::Validation(errors)) if errors.has("amount")
        ));
        assert_eq!(book.account(account.id).unwrap().balance, Decimal::from(1000));
        assert!(book.movements().is_empty());

        let mut opening = account_draft(0);
        opening.balance = Decimal::MAX;
        assert!(book.create_account(opening).is_err());
    }

    #[test]
    fn account_number_allows_digits_and_dashes_only() {
        let mut book = BankBook::new("EUR");
        let mut draft = account_draft(0);
        draft.account_number = "12AB".into();
        assert!(matches!(
            book.create_account(draft),
            Err(DeskError::Validation(errors)) if errors.has("account_number")
        ));
    }

    #[test]
    fn movements_apply_signed_effect_and_running_balance() {
        let mut book = BankBook::new("EUR");
        let account = book.create_account(account_draft(1000)).unwrap();

        let deposit = book
            .create_movement(movement(account.id, BankMovementType::Deposit, 500, day(2)))
            .unwrap();
        assert_eq!(deposit.balance, Decimal::from(1500));
        assert!(deposit.reference.starts_with("MOV-"));

        let fee = book
            .create_movement(movement(account.id, BankMovementType::Fee, 15, day(3)))
            .unwrap();
        assert_eq!(fee.balance, Decimal::from(1485));

        book.create_movement(movement(account.id, BankMovementType::Interest, 5, day(4)))
            .unwrap();
        book.create_movement(movement(account.id, BankMovementType::TransferOut, 90, day(5)))
            .unwrap();
        assert_eq!(book.account(account.id).unwrap().balance, Decimal::from(1400));
    }

    #[test]
    fn movement_needs_known_account_and_positive_amount() {
        let mut book = BankBook::new("EUR");
        let Err(DeskError::Validation(errors)) = book.create_movement(movement(
            Uuid::new_v4(),
            BankMovementType::Deposit,
            0,
            day(1),
        )) else {
            panic!("expected validation errors");
        };
        assert!(errors.has("bank_account_id"));
        assert!(errors.has("amount"));
        assert!(book.movements().is_empty());
    }

    #[test]
    fn editing_or_deleting_movement_keeps_balance() {
        let mut book = BankBook::new("EUR");
        let account = book.create_account(account_draft(100)).unwrap();
        let deposit = book
            .create_movement(movement(account.id, BankMovementType::Deposit, 50, day(2)))
            .unwrap();

        book.update_movement(deposit.id, movement(account.id, BankMovementType::Deposit, 80, day(2)))
            .unwrap();
        assert_eq!(book.account(account.id).unwrap().balance, Decimal::from(150));

        book.delete_movement(deposit.id).unwrap();
        assert_eq!(book.account(account.id).unwrap().balance, Decimal::from(150));
    }

    #[test]
    fn reconciliation_and_filters() {
        let mut book = BankBook::new("EUR");
        let main = book.create_account(account_draft(0)).unwrap();
        let savings = book.create_account(account_draft(0)).unwrap();
        let first = book
            .create_movement(movement(main.id, BankMovementType::Deposit, 10, day(1)))
            .unwrap();
        book.create_movement(movement(main.id, BankMovementType::Withdrawal, 5, day(10)))
            .unwrap();
        book.create_movement(movement(savings.id, BankMovementType::Deposit, 7, day(5)))
            .unwrap();

        assert!(book.toggle_reconciliation(first.id).unwrap().is_reconciled);

        let only_main = MovementFilter {
            bank_account_id: Some(main.id),
            ..MovementFilter::default()
        };
        assert_eq!(book.filter_movements(&only_main).len(), 2);
        assert_eq!(book.unreconciled_count(&only_main), 1);

        let early = MovementFilter {
            to: Some(day(5)),
            ..MovementFilter::default()
        };
        assert_eq!(book.filter_movements(&early).len(), 2);

        let deposits = MovementFilter {
            movement_type: Some(BankMovementType::Deposit),
            ..MovementFilter::default()
        };
        assert_eq!(book.filter_movements(&deposits).len(), 2);
    }

    #[test]
    fn total_balance_counts_active_accounts() {
        let mut book = BankBook::new("EUR");
        book.create_account(account_draft(1000)).unwrap();
        let idle = book.create_account(account_draft(250)).unwrap();
        book.toggle_account(idle.id).unwrap();
        assert_eq!(book.total_active_balance(), Decimal::from(1000));
    }

    #[test]
    fn update_account_replaces_balance() {
        let mut book = BankBook::new("EUR");
        let account = book.create_account(account_draft(1000)).unwrap();
        let mut draft = account_draft(300);
        draft.currency = Some("usd".into());
        let updated = book.update_account(account.id, draft).unwrap();
        assert_eq!(updated.balance, Decimal::from(300));
        assert_eq!(updated.currency, "USD");
    }
}
