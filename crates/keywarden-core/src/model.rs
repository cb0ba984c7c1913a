// ABOUTME: Domain types for the key inventory: key records, categories, and localized text.
// ABOUTME: Plain serde structs; the store persists them, builders consume them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Row id of a key record in the store.
pub type KeyId = i64;

/// The sentinel category every store carries. It cannot be deleted and
/// receives the keys of any category that is.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One tracked license key and its sale metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: KeyId,
    pub key: String,
    pub category: String,
    pub sold: bool,
    pub buyer: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
    pub manual_order: i64,
    pub price_brl: Option<f64>,
    pub price_usd: Option<f64>,
    pub channel: Option<String>,
}

impl KeyRecord {
    /// Whether the key can still be delivered.
    pub fn is_available(&self) -> bool {
        !self.sold
    }
}

/// A piece of text maintained in all three supported locales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleText {
    pub pt: String,
    pub en: String,
    pub es: String,
}

impl LocaleText {
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::PtBr => &self.pt,
            Locale::EnUs => &self.en,
            Locale::Es => &self.es,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pt.is_empty() && self.en.is_empty() && self.es.is_empty()
    }
}

/// A product category: instructional texts per locale, document metadata,
/// and default unit costs used by the sales report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Instruction block inserted into the delivery message body.
    pub instructions: LocaleText,
    /// Long-form body rendered into the delivery document, may contain
    /// inline markup and `[PAGE_BREAK]` markers.
    pub document_body: LocaleText,
    pub license_info: LocaleText,
    pub language_info: LocaleText,
    pub delivery_info: LocaleText,
    pub logo_path: Option<String>,
    pub cost_brl: f64,
    pub cost_usd: f64,
}

impl Category {
    /// A category with the given name and everything else empty.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            instructions: LocaleText::default(),
            document_body: LocaleText::default(),
            license_info: LocaleText::default(),
            language_info: LocaleText::default(),
            delivery_info: LocaleText::default(),
            logo_path: None,
            cost_brl: 0.0,
            cost_usd: 0.0,
        }
    }
}
