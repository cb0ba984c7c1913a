// ABOUTME: Builds the localized delivery message for a batch of sold keys.
// ABOUTME: Pure text assembly: header, keys grouped by category, instructions, footer.

use std::collections::BTreeMap;

use crate::locale::Locale;
use crate::model::{Category, KeyRecord};

/// Build the plain-text delivery message for a set of sold keys.
///
/// Keys are grouped by category (sorted by name); each group lists the
/// category as a bold label followed by its keys. Categories that carry
/// instruction text for the locale contribute an instruction section
/// after the key list. The result is what gets copied to the clipboard
/// or used as an email body.
pub fn delivery_message(records: &[KeyRecord], categories: &[Category], locale: Locale) -> String {
    let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records {
        by_category
            .entry(record.category.as_str())
            .or_default()
            .push(record.key.as_str());
    }

    let mut key_lines = Vec::new();
    let mut instruction_lines = Vec::new();

    for (category_name, keys) in &by_category {
        key_lines.push(format!("**{category_name}:**"));
        key_lines.extend(keys.iter().map(|k| k.to_string()));
        key_lines.push(String::new());

        if let Some(category) = categories.iter().find(|c| c.name == *category_name) {
            let instructions = category.instructions.get(locale).trim();
            if !instructions.is_empty() {
                instruction_lines.push("----------".to_string());
                instruction_lines.push(locale.instructions_header(category_name));
                instruction_lines.push(instructions.to_string());
                instruction_lines.push(String::new());
            }
        }
    }

    let mut lines = vec![locale.message_header().to_string(), String::new()];
    lines.extend(key_lines);
    lines.extend(instruction_lines);
    lines.push(locale.message_footer().to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocaleText;

    fn record(key: &str, category: &str) -> KeyRecord {
        KeyRecord {
            id: 0,
            key: key.to_string(),
            category: category.to_string(),
            sold: true,
            buyer: Some("Jane".to_string()),
            sold_at: None,
            manual_order: 0,
            price_brl: Some(10.0),
            price_usd: Some(2.0),
            channel: None,
        }
    }

    fn office_category() -> Category {
        let mut cat = Category::named("Office");
        cat.instructions = LocaleText {
            pt: "Ative em ativacao.example".to_string(),
            en: "Activate at activate.example".to_string(),
            es: String::new(),
        };
        cat
    }

    #[test]
    fn groups_keys_by_sorted_category() {
        let records = vec![
            record("Z-1", "Zeta"),
            record("O-1", "Office"),
            record("O-2", "Office"),
        ];
        let msg = delivery_message(&records, &[], Locale::EnUs);

        let office_at = msg.find("**Office:**").unwrap();
        let zeta_at = msg.find("**Zeta:**").unwrap();
        assert!(office_at < zeta_at, "categories should be sorted");
        assert!(msg.contains("O-1\nO-2"));
        assert!(msg.starts_with(Locale::EnUs.message_header()));
        assert!(msg.ends_with(Locale::EnUs.message_footer()));
    }

    #[test]
    fn includes_instructions_for_locale() {
        let records = vec![record("O-1", "Office")];
        let msg = delivery_message(&records, &[office_category()], Locale::EnUs);

        assert!(msg.contains("----------"));
        assert!(msg.contains("**Instructions for Office (EN-US):**"));
        assert!(msg.contains("Activate at activate.example"));
    }

    #[test]
    fn skips_empty_instructions() {
        let records = vec![record("O-1", "Office")];
        let msg = delivery_message(&records, &[office_category()], Locale::Es);

        assert!(!msg.contains("----------"));
        assert!(msg.contains(Locale::Es.message_header()));
    }

    #[test]
    fn unknown_category_still_lists_keys() {
        let records = vec![record("X-1", "Ghost")];
        let msg = delivery_message(&records, &[], Locale::PtBr);
        assert!(msg.contains("**Ghost:**"));
        assert!(msg.contains("X-1"));
    }
}
