//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output, inspection reports and cookie listings
//! for human-readable terminal output.

pub mod cookie_list;
pub mod json_printer;
pub mod report;
