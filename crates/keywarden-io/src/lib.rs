// ABOUTME: External collaborator seams for keywarden: email, currency quotes, spreadsheet import.
// ABOUTME: Traits and helpers only; SMTP transmission and file parsing live outside this crate.

pub mod import;
pub mod mail;
pub mod quote;

pub use import::{ImportError, column_index, extract_keys};
pub use mail::{MailError, MailMessage, Mailer, MailerConfig, send_in_background};
pub use quote::{AwesomeApiQuotes, QuoteError, QuoteFetcher, fetch_rate_in_background};
