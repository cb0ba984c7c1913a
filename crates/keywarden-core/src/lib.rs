// ABOUTME: Core library for keywarden, containing domain types and pure builders.
// ABOUTME: Defines key records, categories, locales, delivery artifacts, and sales reports.

pub mod document;
pub mod locale;
pub mod message;
pub mod model;
pub mod report;

pub use document::{DeliveryDocument, delivery_document};
pub use locale::Locale;
pub use message::delivery_message;
pub use model::{Category, KeyId, KeyRecord, LocaleText, UNCATEGORIZED};
pub use report::{RangePreset, SaleFact, SalesSummary, summarize};
