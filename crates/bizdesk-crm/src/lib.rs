//! Customer records for the desk: the directory itself, its statistics and
//! the paginated listing used by the customers screen.

pub mod customers;

pub use customers::{CustomerBook, CustomerDraft, CustomerFilter, CustomerStats};
