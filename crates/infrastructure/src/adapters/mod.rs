//! Adapter implementations

mod go_formatter;

pub use go_formatter::GoFormatter;
