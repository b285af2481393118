pub mod auth;
pub mod config;
pub mod contracts;

pub use auth::{is_strong_password, validate_login, validate_registration};
pub use config::ServiceConfig;
pub use contracts::{
    ActivityEntry, ApproveOrderRequest, BalanceOverride, BalanceSheetQuery, ConfirmQuery,
    FormAccepted, HomeSummary, LoginRequest, PageQuery, PeriodQuery, RegisterRequest,
};
