#![doc = include_str!("../README.md")]

mod brl;
mod mail;
mod report;
mod table;

pub use brl::Brl;
pub use mail::{send_report, Mailer, SMTP_HOST};
pub use report::{summarize, summarize_detailed, Detailed, Summary, NO_DATA, NO_DATA_DETAILED};
pub use table::{LoadError, Sale, Table};
