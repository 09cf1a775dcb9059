//! HTTP handlers

pub mod diagnostics;
pub mod health;
pub mod reports;
pub mod share;

pub use diagnostics::diagnose_share;
pub use health::{health_check, store_health};
pub use reports::{create_share_link, get_report, list_reports, revoke_share_link};
pub use share::get_shared_report;
