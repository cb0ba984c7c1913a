// ABOUTME: CSV export of the full inventory in manual display order.
// ABOUTME: Hand-assembled rows with RFC 4180 quoting; no spreadsheet library involved.

use std::io::Write;

use crate::error::StoreError;
use crate::inventory::InventoryStore;

const HEADER: &str = "Key,Category,Status,Buyer,Sold At,Price BRL,Price USD,Channel";

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl InventoryStore {
    /// Write the whole inventory as CSV, one row per key, ordered by
    /// manual display order.
    pub fn export_csv<W: Write>(&self, mut out: W) -> Result<(), StoreError> {
        writeln!(out, "{HEADER}")?;

        for record in self.view().records() {
            let status = if record.sold { "Sold" } else { "Available" };
            let sold_at = record
                .sold_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            let price = |p: Option<f64>| p.map(|p| format!("{p:.2}")).unwrap_or_default();

            let fields = [
                csv_field(&record.key),
                csv_field(&record.category),
                status.to_string(),
                csv_field(record.buyer.as_deref().unwrap_or("")),
                sold_at,
                price(record.price_brl),
                price(record.price_usd),
                csv_field(record.channel.as_deref().unwrap_or("")),
            ];
            writeln!(out, "{}", fields.join(","))?;
        }

        Ok(())
    }
}
