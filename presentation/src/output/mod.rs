//! Output formatting for consensus reports

pub mod console;
pub mod formatter;
