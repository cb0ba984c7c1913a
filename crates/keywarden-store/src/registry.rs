// ABOUTME: Category and sales-channel registries over the store connection.
// ABOUTME: The sentinel category is delete-protected; registry deletes rewrite key references.

use keywarden_core::{Category, LocaleText, UNCATEGORIZED};
use rusqlite::{OptionalExtension, Row, params};

use crate::error::StoreError;
use crate::inventory::InventoryStore;

const CATEGORY_COLUMNS: &str = "id, name,
    instructions_pt, instructions_en, instructions_es,
    document_pt, document_en, document_es,
    license_pt, license_en, license_es,
    language_pt, language_en, language_es,
    delivery_pt, delivery_en, delivery_es,
    logo_path, cost_brl, cost_usd";

fn read_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let text = |base: usize| -> rusqlite::Result<LocaleText> {
        Ok(LocaleText {
            pt: row.get(base)?,
            en: row.get(base + 1)?,
            es: row.get(base + 2)?,
        })
    };
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        instructions: text(2)?,
        document_body: text(5)?,
        license_info: text(8)?,
        language_info: text(11)?,
        delivery_info: text(14)?,
        logo_path: row.get(17)?,
        cost_brl: row.get(18)?,
        cost_usd: row.get(19)?,
    })
}

impl InventoryStore {
    /// All categories in name order, the sentinel included.
    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name COLLATE NOCASE"
        ))?;
        let rows = stmt.query_map([], read_category)?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    /// Case-insensitive lookup by name.
    pub fn find_category(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1 COLLATE NOCASE"
        ))?;
        Ok(stmt.query_row([name], read_category).optional()?)
    }

    /// Create an empty category. Names are unique case-insensitively.
    pub fn add_category(&mut self, name: &str) -> Result<Category, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.find_category(name)?.is_some() {
            return Err(StoreError::DuplicateCategory(name.to_string()));
        }

        self.begin_mutation()?;
        self.conn()
            .execute("INSERT INTO categories (name) VALUES (?1)", [name])?;

        self.find_category(name)?
            .ok_or_else(|| StoreError::CategoryNotFound(name.to_string()))
    }

    /// Replace every editable field of the category matching
    /// `category.name`.
    pub fn update_category(&mut self, category: &Category) -> Result<(), StoreError> {
        if self.find_category(&category.name)?.is_none() {
            return Err(StoreError::CategoryNotFound(category.name.clone()));
        }

        self.begin_mutation()?;
        self.conn().execute(
            "UPDATE categories SET
                instructions_pt = ?1, instructions_en = ?2, instructions_es = ?3,
                document_pt = ?4, document_en = ?5, document_es = ?6,
                license_pt = ?7, license_en = ?8, license_es = ?9,
                language_pt = ?10, language_en = ?11, language_es = ?12,
                delivery_pt = ?13, delivery_en = ?14, delivery_es = ?15,
                logo_path = ?16, cost_brl = ?17, cost_usd = ?18
             WHERE name = ?19 COLLATE NOCASE",
            params![
                category.instructions.pt,
                category.instructions.en,
                category.instructions.es,
                category.document_body.pt,
                category.document_body.en,
                category.document_body.es,
                category.license_info.pt,
                category.license_info.en,
                category.license_info.es,
                category.language_info.pt,
                category.language_info.en,
                category.language_info.es,
                category.delivery_info.pt,
                category.delivery_info.en,
                category.delivery_info.es,
                category.logo_path,
                category.cost_brl,
                category.cost_usd,
                category.name,
            ],
        )?;
        Ok(())
    }

    /// Delete a category and move its keys to the sentinel. The
    /// sentinel itself cannot be deleted.
    pub fn delete_category(&mut self, name: &str) -> Result<(), StoreError> {
        if name.eq_ignore_ascii_case(UNCATEGORIZED) {
            return Err(StoreError::SentinelCategory);
        }
        let category = self
            .find_category(name)?
            .ok_or_else(|| StoreError::CategoryNotFound(name.to_string()))?;

        self.begin_mutation()?;

        let tx = self.conn_mut().transaction()?;
        let moved = tx.execute(
            "UPDATE keys SET category = ?1 WHERE category = ?2 COLLATE NOCASE",
            params![UNCATEGORIZED, category.name],
        )?;
        tx.execute(
            "DELETE FROM categories WHERE name = ?1 COLLATE NOCASE",
            [category.name.as_str()],
        )?;
        tx.commit()?;

        self.load_view()?;
        tracing::info!(category = name, moved, "deleted category");
        Ok(())
    }

    /// All channel names in name order.
    pub fn list_channels(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT name FROM channels ORDER BY name COLLATE NOCASE")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut channels = Vec::new();
        for row in rows {
            channels.push(row?);
        }
        Ok(channels)
    }

    fn channel_exists(&self, name: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM channels WHERE name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Register a channel if it is not known yet. Returns whether a row
    /// was created.
    pub fn ensure_channel(&mut self, name: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.channel_exists(name)? {
            return Ok(false);
        }

        self.begin_mutation()?;
        self.conn()
            .execute("INSERT INTO channels (name) VALUES (?1)", [name])?;
        Ok(true)
    }

    /// Rename a channel, rewriting the reference on every key that
    /// points at it.
    pub fn rename_channel(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if !self.channel_exists(old)? {
            return Err(StoreError::ChannelNotFound(old.to_string()));
        }
        if !old.eq_ignore_ascii_case(new) && self.channel_exists(new)? {
            return Err(StoreError::DuplicateChannel(new.to_string()));
        }

        self.begin_mutation()?;

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "UPDATE channels SET name = ?1 WHERE name = ?2 COLLATE NOCASE",
            params![new, old],
        )?;
        tx.execute(
            "UPDATE keys SET channel = ?1 WHERE channel = ?2 COLLATE NOCASE",
            params![new, old],
        )?;
        tx.commit()?;

        self.load_view()?;
        Ok(())
    }

    /// Delete a channel, clearing the reference on affected keys.
    pub fn delete_channel(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.channel_exists(name)? {
            return Err(StoreError::ChannelNotFound(name.to_string()));
        }

        self.begin_mutation()?;

        let tx = self.conn_mut().transaction()?;
        tx.execute(
            "DELETE FROM channels WHERE name = ?1 COLLATE NOCASE",
            [name],
        )?;
        tx.execute(
            "UPDATE keys SET channel = NULL WHERE channel = ?1 COLLATE NOCASE",
            [name],
        )?;
        tx.commit()?;

        self.load_view()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, InventoryStore) {
        let dir = TempDir::new().unwrap();
        let store = InventoryStore::open(&dir.path().join("inv.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn sentinel_exists_and_cannot_be_deleted() {
        let (_dir, mut store) = open_store();

        let names: Vec<String> = store
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(names.contains(&UNCATEGORIZED.to_string()));

        assert!(matches!(
            store.delete_category(UNCATEGORIZED),
            Err(StoreError::SentinelCategory)
        ));
        assert!(matches!(
            store.delete_category("uncategorized"),
            Err(StoreError::SentinelCategory)
        ));
    }

    #[test]
    fn category_names_are_unique_case_insensitively() {
        let (_dir, mut store) = open_store();

        store.add_category("Office").unwrap();
        assert!(matches!(
            store.add_category("OFFICE"),
            Err(StoreError::DuplicateCategory(_))
        ));
        assert!(matches!(store.add_category("  "), Err(StoreError::EmptyName)));
    }

    #[test]
    fn deleting_a_category_reassigns_its_keys() {
        let (_dir, mut store) = open_store();
        store.add_category("Office").unwrap();
        store
            .add_keys(&["K1".to_string(), "K2".to_string()], "Office", None)
            .unwrap();

        store.delete_category("Office").unwrap();

        assert!(store.find_category("Office").unwrap().is_none());
        for record in store.view().records() {
            assert_eq!(record.category, UNCATEGORIZED);
        }
    }

    #[test]
    fn deleting_a_category_reassigns_case_variant_keys() {
        let (_dir, mut store) = open_store();
        store.add_category("Office").unwrap();
        store.add_keys(&["K1".to_string()], "office", None).unwrap();

        store.delete_category("Office").unwrap();

        assert!(store.find_category("office").unwrap().is_none());
        assert_eq!(store.view().by_key("K1").unwrap().category, UNCATEGORIZED);
    }

    #[test]
    fn update_category_replaces_details() {
        let (_dir, mut store) = open_store();
        let mut category = store.add_category("Office").unwrap();
        category.instructions.en = "Activate at activate.example".to_string();
        category.cost_brl = 12.5;
        category.logo_path = Some("logos/office.png".to_string());

        store.update_category(&category).unwrap();

        let loaded = store.find_category("Office").unwrap().unwrap();
        assert_eq!(loaded.instructions.en, "Activate at activate.example");
        assert_eq!(loaded.cost_brl, 12.5);
        assert_eq!(loaded.logo_path.as_deref(), Some("logos/office.png"));
    }

    #[test]
    fn channel_rename_rewrites_key_references() {
        let (_dir, mut store) = open_store();
        store
            .add_keys(&["K1".to_string()], "Office", Some("Store"))
            .unwrap();
        assert!(store.list_channels().unwrap().contains(&"Store".to_string()));

        store.rename_channel("Store", "Web Store").unwrap();

        assert_eq!(store.list_channels().unwrap(), vec!["Web Store"]);
        assert_eq!(
            store.view().by_key("K1").unwrap().channel.as_deref(),
            Some("Web Store")
        );
    }

    #[test]
    fn channel_delete_clears_key_references() {
        let (_dir, mut store) = open_store();
        store
            .add_keys(&["K1".to_string()], "Office", Some("Store"))
            .unwrap();

        store.delete_channel("Store").unwrap();

        assert!(store.list_channels().unwrap().is_empty());
        assert!(store.view().by_key("K1").unwrap().channel.is_none());
        assert!(matches!(
            store.delete_channel("Store"),
            Err(StoreError::ChannelNotFound(_))
        ));
    }

    #[test]
    fn channel_rename_and_delete_cover_case_variant_references() {
        let (_dir, mut store) = open_store();
        store.ensure_channel("Store").unwrap();
        store
            .add_keys(&["K1".to_string()], "Office", Some("store"))
            .unwrap();

        store.rename_channel("Store", "Web Store").unwrap();
        assert_eq!(
            store.view().by_key("K1").unwrap().channel.as_deref(),
            Some("Web Store")
        );

        store.delete_channel("web store").unwrap();
        assert!(store.view().by_key("K1").unwrap().channel.is_none());
    }

    #[test]
    fn ensure_channel_is_idempotent() {
        let (_dir, mut store) = open_store();
        assert!(store.ensure_channel("Store").unwrap());
        assert!(!store.ensure_channel("store").unwrap());
        assert_eq!(store.list_channels().unwrap().len(), 1);
    }
}
