// ABOUTME: Content model and builder for the delivery document (rendered to PDF elsewhere).
// ABOUTME: One section per category: logo, info table, key blocks, paged instruction text.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::locale::Locale;
use crate::model::{Category, KeyRecord};

/// Marker inside a category's document body that starts a new page.
pub const PAGE_BREAK: &str = "[PAGE_BREAK]";

/// A fully assembled delivery document. This is a pure content model;
/// a PDF renderer consumes it and owns all layout concerns. Inline
/// markup (`**bold**`, `*italic*`, `__underline__`) is passed through
/// verbatim for the renderer to interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDocument {
    pub sections: Vec<CategorySection>,
    pub footer: String,
}

/// The document content for one category of delivered keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: String,
    pub logo_path: Option<String>,
    pub header: String,
    /// Label/value rows for the buyer info table. Rows with empty
    /// values are omitted.
    pub info: Vec<(String, String)>,
    pub key_label: String,
    pub keys: Vec<String>,
    pub instruction_title: Option<String>,
    /// Instruction text split on [`PAGE_BREAK`], placeholders resolved.
    pub instruction_pages: Vec<String>,
}

/// Build the delivery document for a batch of sold keys.
///
/// Sections are emitted per category in sorted name order. The category's
/// document body has `{keys}`, `{buyer}`, and `{greeting}` placeholders
/// substituted and is split into pages on [`PAGE_BREAK`].
pub fn delivery_document(
    records: &[KeyRecord],
    categories: &[Category],
    locale: Locale,
    buyer: &str,
    buyer_email: &str,
    now: DateTime<Utc>,
) -> DeliveryDocument {
    let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records {
        by_category
            .entry(record.category.as_str())
            .or_default()
            .push(record.key.as_str());
    }

    let labels = locale.info_labels();
    let mut sections = Vec::new();

    for (category_name, keys) in &by_category {
        let category = categories.iter().find(|c| c.name == *category_name);

        let mut info = Vec::new();
        if let Some(cat) = category {
            let values = [
                buyer,
                buyer_email,
                category_name,
                cat.license_info.get(locale),
                cat.language_info.get(locale),
                cat.delivery_info.get(locale),
            ];
            for (label, value) in labels.iter().zip(values) {
                if !value.is_empty() {
                    info.push((label.to_string(), value.to_string()));
                }
            }
        }

        let body = category
            .map(|c| c.document_body.get(locale).trim())
            .unwrap_or("");
        let instruction_pages = if body.is_empty() {
            Vec::new()
        } else {
            let resolved = body
                .replace("{keys}", &keys.join("\n"))
                .replace("{buyer}", buyer)
                .replace("{greeting}", locale.greeting(now.hour()));
            resolved
                .split(PAGE_BREAK)
                .map(str::trim)
                .filter(|page| !page.is_empty())
                .map(str::to_string)
                .collect()
        };

        sections.push(CategorySection {
            category: category_name.to_string(),
            logo_path: category.and_then(|c| c.logo_path.clone()),
            header: locale.document_header().to_string(),
            info,
            key_label: locale.key_label(keys.len()).to_string(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            instruction_title: if instruction_pages.is_empty() {
                None
            } else {
                Some(locale.instruction_title().to_string())
            },
            instruction_pages,
        });
    }

    DeliveryDocument {
        sections,
        footer: locale.document_footer().to_string(),
    }
}

/// Strip characters that are unsafe in file names.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect()
}

/// Suggested file name for a rendered delivery document:
/// `Delivery_<buyer>_<timestamp>.pdf` with spaces underscored.
pub fn document_file_name(buyer: &str, now: DateTime<Utc>) -> String {
    let safe = sanitize_filename(buyer).replace(' ', "_");
    format!("Delivery_{}_{}.pdf", safe, now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocaleText;
    use chrono::TimeZone;

    fn record(key: &str, category: &str) -> KeyRecord {
        KeyRecord {
            id: 0,
            key: key.to_string(),
            category: category.to_string(),
            sold: true,
            buyer: Some("Jane Roe".to_string()),
            sold_at: None,
            manual_order: 0,
            price_brl: None,
            price_usd: None,
            channel: None,
        }
    }

    fn office_category() -> Category {
        let mut cat = Category::named("Office");
        cat.logo_path = Some("logos/office.png".to_string());
        cat.license_info.en = "Lifetime".to_string();
        cat.language_info.en = "English".to_string();
        cat.document_body.en = format!(
            "{{greeting}}, {{buyer}}!\nEnter:\n{{keys}}\n{PAGE_BREAK}\nSecond page."
        );
        cat
    }

    fn at_ten() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn builds_one_section_per_category() {
        let records = vec![
            record("O-1", "Office"),
            record("Z-1", "Zeta"),
            record("O-2", "Office"),
        ];
        let doc = delivery_document(&records, &[office_category()], Locale::EnUs, "Jane Roe", "", at_ten());

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].category, "Office");
        assert_eq!(doc.sections[0].keys, vec!["O-1", "O-2"]);
        assert_eq!(doc.sections[1].category, "Zeta");
        assert_eq!(doc.footer, Locale::EnUs.document_footer());
    }

    #[test]
    fn resolves_placeholders_and_page_breaks() {
        let records = vec![record("O-1", "Office"), record("O-2", "Office")];
        let doc = delivery_document(&records, &[office_category()], Locale::EnUs, "Jane Roe", "", at_ten());

        let section = &doc.sections[0];
        assert_eq!(section.instruction_pages.len(), 2);
        assert!(section.instruction_pages[0].starts_with("Good morning, Jane Roe!"));
        assert!(section.instruction_pages[0].contains("O-1\nO-2"));
        assert_eq!(section.instruction_pages[1], "Second page.");
        assert_eq!(section.instruction_title.as_deref(), Some("Activation Instructions"));
    }

    #[test]
    fn info_table_skips_empty_values() {
        let records = vec![record("O-1", "Office")];
        let doc = delivery_document(&records, &[office_category()], Locale::EnUs, "Jane Roe", "", at_ten());

        let info = &doc.sections[0].info;
        let labels: Vec<&str> = info.iter().map(|(l, _)| l.as_str()).collect();
        // No email and no delivery info were provided.
        assert_eq!(labels, vec!["Buyer", "Product", "License type", "Language"]);
    }

    #[test]
    fn unknown_category_yields_bare_section() {
        let records = vec![record("X-1", "Ghost")];
        let doc = delivery_document(&records, &[], Locale::PtBr, "Jane", "", at_ten());

        let section = &doc.sections[0];
        assert!(section.info.is_empty());
        assert!(section.instruction_pages.is_empty());
        assert!(section.instruction_title.is_none());
        assert_eq!(section.key_label, Locale::PtBr.key_label(1));
    }

    #[test]
    fn file_name_is_sanitized() {
        let name = document_file_name("Jane/Roe: Ltd", at_ten());
        assert_eq!(name, "Delivery_JaneRoe_Ltd_20240301100000.pdf");
    }
}
