//! Field-level checks shared by every draft type.
//!
//! Checks never short-circuit: a draft is validated in full and every failing
//! field is reported, so a caller can show all inline errors at once.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

/// Largest money amount a form accepts (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Largest quantity a form accepts (one million).
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|err| err.field == field)
    }

    /// Returns `true` when the value is present so callers can chain
    /// format checks that only make sense on non-blank input.
    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, "is required");
            return false;
        }
        true
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if self.required(field, value) && value.trim().chars().count() < min {
            self.push(field, format!("must be at least {min} characters"));
        }
    }

    pub fn digits(&mut self, field: &str, value: &str) {
        if self.required(field, value) && !value.trim().chars().all(|c| c.is_ascii_digit()) {
            self.push(field, "must contain digits only");
        }
    }

    pub fn digits_or_dash(&mut self, field: &str, value: &str) {
        if self.required(field, value)
            && !value
                .trim()
                .chars()
                .all(|c| c.is_ascii_digit() || c == '-')
        {
            self.push(field, "must contain digits and dashes only");
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if self.required(field, value) {
            self.optional_email(field, value);
        }
    }

    pub fn optional_email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() && !is_email(value) {
            self.push(field, "must be a valid email address");
        }
    }

    pub fn min_decimal(&mut self, field: &str, value: Decimal, min: Decimal) {
        if value < min {
            self.push(field, format!("must be at least {min}"));
        }
    }

    pub fn range_decimal(&mut self, field: &str, value: Decimal, min: Decimal, max: Decimal) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    /// Money field in `min..=MAX_AMOUNT`.
    pub fn amount(&mut self, field: &str, value: Decimal, min: Decimal) {
        self.range_decimal(field, value, min, MAX_AMOUNT);
    }

    pub fn quantity(&mut self, field: &str, value: Decimal, min: Decimal) {
        self.range_decimal(field, value, min, MAX_QUANTITY);
    }

    pub fn range_u8(&mut self, field: &str, value: u8, min: u8, max: u8) {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DeskError::Validation(self))
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|err| format!("{} {}", err.field, err.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}
