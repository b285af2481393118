use bizdesk_core::accounting::{Account, AccountCategory, AccountType};
use bizdesk_core::filter::contains_ci;
use bizdesk_core::{DeskError, FormErrors, MAX_AMOUNT, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::default_true;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDraft {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: AccountCategory,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl AccountDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.digits("code", &self.code);
        errors.min_len("name", &self.name, 3);
        errors.into_result()
    }
}

#[derive(Debug, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
}

impl ChartOfAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn create(&mut self, draft: AccountDraft) -> Result<Account> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, None)?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            code,
            name: draft.name.trim().to_string(),
            account_type: draft.account_type,
            category: draft.category,
            parent_id: draft.parent_id,
            balance: Decimal::ZERO,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Replaces the editable fields; balance and creation stamp are kept.
    pub fn update(&mut self, id: Uuid, draft: AccountDraft) -> Result<Account> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, Some(id))?;

        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("account", id))?;
        account.code = code;
        account.name = draft.name.trim().to_string();
        account.account_type = draft.account_type;
        account.category = draft.category;
        account.parent_id = draft.parent_id;
        account.is_active = draft.is_active;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Account> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("account", id))?;
        Ok(self.accounts.remove(index))
    }

    pub fn toggle_active(&mut self, id: Uuid) -> Result<Account> {
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("account", id))?;
        account.is_active = !account.is_active;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    pub fn search(&self, term: &str) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|account| contains_ci(&account.code, term) || contains_ci(&account.name, term))
            .collect()
    }

    /// Overwrites the stored balance; nothing else in the desk moves it.
    pub fn set_balance(&mut self, id: Uuid, balance: Decimal) -> Result<Account> {
        let mut errors = FormErrors::new();
        errors.range_decimal("balance", balance, -MAX_AMOUNT, MAX_AMOUNT);
        errors.into_result()?;

        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or_else(|| DeskError::not_found("account", id))?;
        account.balance = balance;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<()> {
        let taken = self
            .accounts
            .iter()
            .any(|account| account.code == code && Some(account.id) != except);
        if taken {
            return Err(DeskError::DuplicateCode {
                entity: "account",
                code: code.to_string(),
            });
        }
        Ok(())
    }
}
