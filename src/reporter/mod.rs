//! Reporter module for output formatting

pub mod console;
pub mod issue_report;
pub mod json;

pub use console::ConsoleReporter;
pub use issue_report::IssueReport;
pub use json::JsonReporter;
