//! Business logic services for the field report server

pub mod diagnostics;
pub mod report;

pub use diagnostics::DiagnosticsService;
pub use report::ReportService;
