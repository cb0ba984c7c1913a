// ABOUTME: The SQLite-backed inventory store and its derived in-memory view.
// ABOUTME: Mutations run snapshot, validate, persist, refresh and are never partially applied.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use keywarden_core::{KeyId, KeyRecord, SaleFact};
use rusqlite::{Connection, params};

use crate::error::StoreError;
use crate::migrate;
use crate::snapshot::{SnapshotError, SnapshotSlots, UndoState};

/// Storage format for the sale timestamp. Lexicographic order matches
/// chronological order, so report queries can range over the raw text.
const SOLD_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn encode_sold_at(at: DateTime<Utc>) -> String {
    at.format(SOLD_AT_FORMAT).to_string()
}

fn decode_sold_at(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    NaiveDateTime::parse_from_str(&raw, SOLD_AT_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Result of a batch key insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub duplicates: usize,
}

/// Filters for listing keys. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    /// Case-insensitive substring over key, category, buyer, and channel.
    pub search: Option<String>,
    pub category: Option<String>,
    pub channel: Option<ChannelFilter>,
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFilter {
    Named(String),
    Unassigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Sold,
    Available,
}

/// A full-row edit of one key, as submitted by the edit form.
#[derive(Debug, Clone)]
pub struct KeyUpdate {
    pub key: String,
    pub category: String,
    pub sold: bool,
    pub buyer: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
    pub price_brl: Option<f64>,
    pub price_usd: Option<f64>,
    pub channel: Option<String>,
}

/// Derived in-memory caches over the keys table, rebuilt after every
/// mutation. Records are held in manual display order.
#[derive(Debug, Default)]
pub struct InventoryView {
    records: Vec<KeyRecord>,
    ids_by_key: HashMap<String, KeyId>,
    index_by_id: HashMap<KeyId, usize>,
}

impl InventoryView {
    fn rebuild(records: Vec<KeyRecord>) -> Self {
        let ids_by_key = records.iter().map(|r| (r.key.clone(), r.id)).collect();
        let index_by_id = records.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self {
            records,
            ids_by_key,
            index_by_id,
        }
    }

    /// All records in manual display order.
    pub fn records(&self) -> &[KeyRecord] {
        &self.records
    }

    pub fn get(&self, id: KeyId) -> Option<&KeyRecord> {
        self.index_by_id.get(&id).map(|&i| &self.records[i])
    }

    /// Look up by exact, case-sensitive key string.
    pub fn by_key(&self, key: &str) -> Option<&KeyRecord> {
        self.ids_by_key.get(key).and_then(|&id| self.get(id))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.ids_by_key.contains_key(key)
    }

    /// Records matching the filter, preserving manual order.
    pub fn filtered(&self, filter: &KeyFilter) -> Vec<&KeyRecord> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.records
            .iter()
            .filter(|record| Self::matches(record, filter, needle.as_deref()))
            .collect()
    }

    fn matches(record: &KeyRecord, filter: &KeyFilter, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let haystacks = [
                Some(record.key.as_str()),
                Some(record.category.as_str()),
                record.buyer.as_deref(),
                record.channel.as_deref(),
            ];
            let hit = haystacks
                .into_iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = &filter.category
            && record.category != *category
        {
            return false;
        }

        match &filter.channel {
            Some(ChannelFilter::Named(name)) => {
                if record.channel.as_deref() != Some(name.as_str()) {
                    return false;
                }
            }
            Some(ChannelFilter::Unassigned) => {
                if record.channel.is_some() {
                    return false;
                }
            }
            None => {}
        }

        match filter.status {
            Some(StatusFilter::Sold) => record.sold,
            Some(StatusFilter::Available) => !record.sold,
            None => true,
        }
    }
}

/// The inventory store: one SQLite connection, the snapshot slots next
/// to the database file, and the derived view.
pub struct InventoryStore {
    conn: Connection,
    db_path: PathBuf,
    slots: SnapshotSlots,
    view: InventoryView,
}

impl InventoryStore {
    /// Open or create the inventory database, run migrations, and build
    /// the view.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = open_connection(path)?;
        let applied = migrate::migrate(&conn)?;
        if applied > 0 {
            tracing::info!(applied, db = %path.display(), "migrated inventory database");
        }

        let mut store = Self {
            conn,
            db_path: path.to_path_buf(),
            slots: SnapshotSlots::new(path),
            view: InventoryView::default(),
        };
        store.load_view()?;
        Ok(store)
    }

    pub fn view(&self) -> &InventoryView {
        &self.view
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn undo_state(&self) -> UndoState {
        self.slots.state()
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Rebuild the derived caches from the keys table.
    pub fn load_view(&mut self) -> Result<(), StoreError> {
        let records = {
            let mut stmt = self.conn.prepare(
                "SELECT id, key, category, sold, buyer, sold_at,
                        manual_order, price_brl, price_usd, channel
                 FROM keys ORDER BY manual_order ASC, id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(KeyRecord {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    category: row.get(2)?,
                    sold: row.get(3)?,
                    buyer: row.get(4)?,
                    sold_at: decode_sold_at(row.get(5)?),
                    manual_order: row.get(6)?,
                    price_brl: row.get(7)?,
                    price_usd: row.get(8)?,
                    channel: row.get(9)?,
                })
            })?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            records
        };

        self.view = InventoryView::rebuild(records);
        Ok(())
    }

    /// Checkpoint the WAL and copy the live file into the undo slot.
    /// Every mutating operation calls this after validation passes.
    pub(crate) fn begin_mutation(&mut self) -> Result<(), StoreError> {
        self.checkpoint()?;
        self.slots.record()?;
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    /// Batch-insert keys into a category. Blank entries are skipped;
    /// keys already present (exact, case-sensitive) are counted as
    /// duplicates and left alone.
    pub fn add_keys(
        &mut self,
        keys: &[String],
        category: &str,
        channel: Option<&str>,
    ) -> Result<AddOutcome, StoreError> {
        let mut fresh: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut duplicates = 0;

        for key in keys {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            if self.view.contains_key(key) || !seen.insert(key) {
                duplicates += 1;
            } else {
                fresh.push(key);
            }
        }

        if fresh.is_empty() {
            return Ok(AddOutcome {
                added: 0,
                duplicates,
            });
        }

        // Category names are unique NOCASE; store the registered casing.
        let category = match self.find_category(category)? {
            Some(existing) => existing.name,
            None => category.to_string(),
        };

        self.begin_mutation()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
            [category.as_str()],
        )?;
        if let Some(channel) = channel {
            tx.execute("INSERT OR IGNORE INTO channels (name) VALUES (?1)", [channel])?;
        }

        let next_order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(manual_order), 0) FROM keys",
            [],
            |row| row.get(0),
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO keys (key, category, sold, manual_order, channel)
                 VALUES (?1, ?2, 0, ?3, ?4)",
            )?;
            for (offset, key) in fresh.iter().enumerate() {
                insert.execute(params![key, category, next_order + 1 + offset as i64, channel])?;
            }
        }
        tx.commit()?;

        self.load_view()?;
        tracing::info!(added = fresh.len(), duplicates, category = %category, "added keys");
        Ok(AddOutcome {
            added: fresh.len(),
            duplicates,
        })
    }

    /// Delete keys by id. Fails without touching anything if any id is
    /// unknown.
    pub fn delete_keys(&mut self, ids: &[KeyId]) -> Result<usize, StoreError> {
        for &id in ids {
            if self.view.get(id).is_none() {
                return Err(StoreError::KeyNotFound(id));
            }
        }
        if ids.is_empty() {
            return Ok(0);
        }

        self.begin_mutation()?;

        let tx = self.conn.transaction()?;
        {
            let mut delete = tx.prepare("DELETE FROM keys WHERE id = ?1")?;
            for &id in ids {
                delete.execute([id])?;
            }
        }
        tx.commit()?;

        self.load_view()?;
        tracing::info!(deleted = ids.len(), "deleted keys");
        Ok(ids.len())
    }

    /// Rewrite the manual display order. Listed keys take positions
    /// 1..n in the given sequence; any unlisted keys follow in their
    /// current relative order. The list must be duplicate-free.
    pub fn reorder(&mut self, ordered_keys: &[&str]) -> Result<(), StoreError> {
        let mut listed: HashSet<&str> = HashSet::new();
        for &key in ordered_keys {
            if !self.view.contains_key(key) {
                return Err(StoreError::UnknownKey(key.to_string()));
            }
            if !listed.insert(key) {
                return Err(StoreError::DuplicateKey(key.to_string()));
            }
        }
        let trailing: Vec<String> = self
            .view
            .records()
            .iter()
            .filter(|r| !listed.contains(r.key.as_str()))
            .map(|r| r.key.clone())
            .collect();

        self.begin_mutation()?;

        let tx = self.conn.transaction()?;
        {
            let mut update = tx.prepare("UPDATE keys SET manual_order = ?1 WHERE key = ?2")?;
            let all = ordered_keys
                .iter()
                .copied()
                .chain(trailing.iter().map(String::as_str));
            for (position, key) in all.enumerate() {
                update.execute(params![position as i64 + 1, key])?;
            }
        }
        tx.commit()?;

        self.load_view()?;
        Ok(())
    }

    /// Apply a full-row edit to one key. Marking a sold key available
    /// clears buyer, date, and prices; the channel follows the
    /// submitted value.
    pub fn update_key(&mut self, id: KeyId, update: KeyUpdate) -> Result<KeyRecord, StoreError> {
        if self.view.get(id).is_none() {
            return Err(StoreError::KeyNotFound(id));
        }

        let key = update.key.trim().to_string();
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        if let Some(existing) = self.view.by_key(&key)
            && existing.id != id
        {
            return Err(StoreError::DuplicateKey(key));
        }

        let category = match self.find_category(&update.category)? {
            Some(existing) => existing.name,
            None => update.category.clone(),
        };
        let update = KeyUpdate { key, category, ..update };
        let update = if update.sold {
            let buyer_ok = update
                .buyer
                .as_deref()
                .is_some_and(|b| !b.trim().is_empty());
            if !buyer_ok {
                return Err(StoreError::EmptyBuyer);
            }
            validate_price(update.price_brl)?;
            validate_price(update.price_usd)?;
            update
        } else {
            // Available keys carry no sale fields. The channel is kept
            // as submitted so an unrelated edit cannot erase it.
            KeyUpdate {
                buyer: None,
                sold_at: None,
                price_brl: None,
                price_usd: None,
                ..update
            }
        };

        self.begin_mutation()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?1)",
            [update.category.as_str()],
        )?;
        if let Some(channel) = &update.channel {
            tx.execute("INSERT OR IGNORE INTO channels (name) VALUES (?1)", [channel.as_str()])?;
        }
        tx.execute(
            "UPDATE keys SET key = ?1, category = ?2, sold = ?3, buyer = ?4,
                    sold_at = ?5, price_brl = ?6, price_usd = ?7, channel = ?8
             WHERE id = ?9",
            params![
                update.key,
                update.category,
                update.sold,
                update.buyer,
                update.sold_at.map(encode_sold_at),
                update.price_brl,
                update.price_usd,
                update.channel,
                id,
            ],
        )?;
        tx.commit()?;

        self.load_view()?;
        self.view
            .get(id)
            .cloned()
            .ok_or(StoreError::KeyNotFound(id))
    }

    /// Restore the pre-mutation snapshot. Fails with `NothingToUndo`
    /// when no mutation has been recorded since the last undo.
    pub fn undo(&mut self) -> Result<(), StoreError> {
        if self.slots.state() != UndoState::Undoable {
            return Err(SnapshotError::NothingToUndo.into());
        }
        self.swap_database(SnapshotSlots::undo)
    }

    /// Re-apply the mutation that was just undone.
    pub fn redo(&mut self) -> Result<(), StoreError> {
        if self.slots.state() != UndoState::Redoable {
            return Err(SnapshotError::NothingToRedo.into());
        }
        self.swap_database(SnapshotSlots::redo)
    }

    /// Close the connection, swap database files, and reopen. The live
    /// database is reopened and the view rebuilt even if the file swap
    /// fails partway.
    fn swap_database(
        &mut self,
        swap: fn(&SnapshotSlots) -> Result<(), SnapshotError>,
    ) -> Result<(), StoreError> {
        self.checkpoint()?;

        let old = mem::replace(&mut self.conn, Connection::open_in_memory()?);
        if let Err((conn, err)) = old.close() {
            self.conn = conn;
            return Err(err.into());
        }

        let swapped = swap(&self.slots);
        self.conn = open_connection(&self.db_path)?;
        self.load_view()?;
        swapped?;
        Ok(())
    }

    /// Sold keys within the inclusive date range, joined to their
    /// category's default costs, for report aggregation.
    pub fn sales_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SaleFact>, StoreError> {
        let from = format!("{} 00:00:00", start.format("%Y-%m-%d"));
        let to = format!("{} 23:59:59", end.format("%Y-%m-%d"));

        let mut stmt = self.conn.prepare(
            "SELECT k.category, k.price_brl, k.price_usd, c.cost_brl, c.cost_usd
             FROM keys k LEFT JOIN categories c ON c.name = k.category
             WHERE k.sold = 1 AND k.sold_at >= ?1 AND k.sold_at <= ?2
             ORDER BY k.sold_at ASC",
        )?;
        let rows = stmt.query_map(params![from, to], |row| {
            Ok(SaleFact {
                category: row.get(0)?,
                price_brl: row.get(1)?,
                price_usd: row.get(2)?,
                cost_brl: row.get(3)?,
                cost_usd: row.get(4)?,
            })
        })?;

        let mut facts = Vec::new();
        for row in rows {
            facts.push(row?);
        }
        Ok(facts)
    }
}

pub(crate) fn validate_price(price: Option<f64>) -> Result<(), StoreError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(StoreError::InvalidPrice),
        _ => Ok(()),
    }
}

fn open_connection(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
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

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_keys_skips_duplicates_and_blanks() {
        let (_dir, mut store) = open_store();

        let outcome = store
            .add_keys(&keys(&["A-1", "A-2", "", "A-1"]), "Office", None)
            .unwrap();
        assert_eq!(outcome, AddOutcome { added: 2, duplicates: 1 });

        let outcome = store.add_keys(&keys(&["A-2", "A-3"]), "Office", None).unwrap();
        assert_eq!(outcome, AddOutcome { added: 1, duplicates: 1 });

        let listed: Vec<&str> = store.view().records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(listed, vec!["A-1", "A-2", "A-3"]);
    }

    #[test]
    fn add_is_case_sensitive() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["abc-1"]), "Office", None).unwrap();

        let outcome = store.add_keys(&keys(&["ABC-1"]), "Office", None).unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(store.view().records().len(), 2);
    }

    #[test]
    fn reorder_rewrites_display_order() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1", "K2", "K3"]), "Office", None).unwrap();

        store.reorder(&["K3", "K1", "K2"]).unwrap();

        let listed: Vec<&str> = store.view().records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(listed, vec!["K3", "K1", "K2"]);
    }

    #[test]
    fn reorder_keeps_unlisted_keys_after_listed() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1", "K2", "K3"]), "Office", None).unwrap();

        store.reorder(&["K3"]).unwrap();

        let listed: Vec<&str> = store.view().records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(listed, vec!["K3", "K1", "K2"]);
    }

    #[test]
    fn reorder_rejects_unknown_keys() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", None).unwrap();
        assert!(matches!(
            store.reorder(&["K1", "GHOST"]),
            Err(StoreError::UnknownKey(_))
        ));
    }

    #[test]
    fn reorder_rejects_repeated_keys() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1", "K2", "K3"]), "Office", None).unwrap();

        assert!(matches!(
            store.reorder(&["K2", "K1", "K2"]),
            Err(StoreError::DuplicateKey(_))
        ));

        let listed: Vec<&str> = store.view().records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(listed, vec!["K1", "K2", "K3"]);
    }

    #[test]
    fn delete_requires_all_ids_known() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1", "K2"]), "Office", None).unwrap();
        let id = store.view().by_key("K1").unwrap().id;

        assert!(matches!(
            store.delete_keys(&[id, 9999]),
            Err(StoreError::KeyNotFound(9999))
        ));
        assert_eq!(store.view().records().len(), 2);

        store.delete_keys(&[id]).unwrap();
        assert!(store.view().by_key("K1").is_none());
        assert!(store.view().by_key("K2").is_some());
    }

    fn sold_update(key: &str, buyer: &str) -> KeyUpdate {
        KeyUpdate {
            key: key.to_string(),
            category: "Office".to_string(),
            sold: true,
            buyer: Some(buyer.to_string()),
            sold_at: Some(Utc::now()),
            price_brl: Some(10.0),
            price_usd: Some(2.0),
            channel: Some("Store".to_string()),
        }
    }

    #[test]
    fn update_back_to_available_clears_sale_fields() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", None).unwrap();
        let id = store.view().by_key("K1").unwrap().id;

        store.update_key(id, sold_update("K1", "Jane")).unwrap();
        assert!(store.view().get(id).unwrap().sold);

        let mut back = sold_update("K1", "Jane");
        back.sold = false;
        back.channel = None;
        let record = store.update_key(id, back).unwrap();

        assert!(!record.sold);
        assert!(record.buyer.is_none());
        assert!(record.sold_at.is_none());
        assert!(record.price_brl.is_none());
        assert!(record.channel.is_none());
    }

    #[test]
    fn editing_an_available_key_keeps_its_channel() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", Some("Store")).unwrap();
        let id = store.view().by_key("K1").unwrap().id;

        let record = store
            .update_key(
                id,
                KeyUpdate {
                    key: "K1-renamed".to_string(),
                    category: "Office".to_string(),
                    sold: false,
                    buyer: None,
                    sold_at: None,
                    price_brl: None,
                    price_usd: None,
                    channel: Some("Store".to_string()),
                },
            )
            .unwrap();

        assert_eq!(record.key, "K1-renamed");
        assert_eq!(record.channel.as_deref(), Some("Store"));
    }

    #[test]
    fn add_keys_stores_the_registered_category_casing() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", None).unwrap();

        store.add_keys(&keys(&["K2"]), "OFFICE", None).unwrap();

        assert_eq!(store.view().by_key("K2").unwrap().category, "Office");
    }

    #[test]
    fn update_validates_buyer_price_and_key_collisions() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1", "K2"]), "Office", None).unwrap();
        let id = store.view().by_key("K1").unwrap().id;

        let mut no_buyer = sold_update("K1", "  ");
        no_buyer.buyer = Some("  ".to_string());
        assert!(matches!(
            store.update_key(id, no_buyer),
            Err(StoreError::EmptyBuyer)
        ));

        let mut bad_price = sold_update("K1", "Jane");
        bad_price.price_brl = Some(-1.0);
        assert!(matches!(
            store.update_key(id, bad_price),
            Err(StoreError::InvalidPrice)
        ));

        assert!(matches!(
            store.update_key(id, sold_update("K2", "Jane")),
            Err(StoreError::DuplicateKey(_))
        ));
    }

    #[test]
    fn undo_and_redo_swap_whole_states() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", None).unwrap();
        assert_eq!(store.undo_state(), UndoState::Undoable);

        store.undo().unwrap();
        assert!(store.view().records().is_empty());
        assert_eq!(store.undo_state(), UndoState::Redoable);

        store.redo().unwrap();
        assert_eq!(store.view().records().len(), 1);
        assert_eq!(store.view().records()[0].key, "K1");
    }

    #[test]
    fn new_mutation_discards_redo() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["K1"]), "Office", None).unwrap();
        store.undo().unwrap();

        store.add_keys(&keys(&["K2"]), "Office", None).unwrap();
        assert!(matches!(
            store.redo(),
            Err(StoreError::Snapshot(SnapshotError::NothingToRedo))
        ));

        store.undo().unwrap();
        assert!(store.view().records().is_empty());
    }

    #[test]
    fn undo_on_fresh_store_is_an_error() {
        let (_dir, mut store) = open_store();
        assert!(matches!(
            store.undo(),
            Err(StoreError::Snapshot(SnapshotError::NothingToUndo))
        ));
    }

    #[test]
    fn filters_compose() {
        let (_dir, mut store) = open_store();
        store.add_keys(&keys(&["OFF-1", "OFF-2"]), "Office", Some("Store")).unwrap();
        store.add_keys(&keys(&["AV-1"]), "Antivirus", None).unwrap();

        let id = store.view().by_key("OFF-1").unwrap().id;
        store.update_key(id, sold_update("OFF-1", "Jane")).unwrap();

        let sold = store.view().filtered(&KeyFilter {
            status: Some(StatusFilter::Sold),
            ..KeyFilter::default()
        });
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].key, "OFF-1");

        let office_available = store.view().filtered(&KeyFilter {
            category: Some("Office".to_string()),
            status: Some(StatusFilter::Available),
            ..KeyFilter::default()
        });
        assert_eq!(office_available.len(), 1);
        assert_eq!(office_available[0].key, "OFF-2");

        let unassigned = store.view().filtered(&KeyFilter {
            channel: Some(ChannelFilter::Unassigned),
            ..KeyFilter::default()
        });
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].key, "AV-1");

        let by_buyer = store.view().filtered(&KeyFilter {
            search: Some("jane".to_string()),
            ..KeyFilter::default()
        });
        assert_eq!(by_buyer.len(), 1);
    }

    #[test]
    fn view_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inv.db");
        {
            let mut store = InventoryStore::open(&path).unwrap();
            store.add_keys(&keys(&["K1", "K2"]), "Office", None).unwrap();
        }

        let store = InventoryStore::open(&path).unwrap();
        let listed: Vec<&str> = store.view().records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(listed, vec!["K1", "K2"]);
    }
}
