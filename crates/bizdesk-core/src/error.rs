use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::FormErrors;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("validation failed: {0}")]
    Validation(FormErrors),

    #[error("{entity} with code '{code}' already exists")]
    DuplicateCode { entity: &'static str, code: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("cannot {action} {entity} while it is {status}")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        status: String,
    },

    #[error("{0} requires explicit confirmation")]
    ConfirmationRequired(&'static str),

    #[error("period start {start} is after period end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl DeskError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
