// ABOUTME: The delivery transaction: mark a batch of keys sold to one buyer, all or nothing.
// ABOUTME: Validates first, snapshots second; every key in the batch shares one sale timestamp.

use chrono::{DateTime, Utc};
use keywarden_core::{KeyId, KeyRecord};
use rusqlite::params;

use crate::error::StoreError;
use crate::inventory::{InventoryStore, encode_sold_at, validate_price};

/// Everything the delivery form submits for one sale.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub ids: Vec<KeyId>,
    pub buyer: String,
    pub buyer_email: Option<String>,
    pub channel: Option<String>,
    pub price_brl: Option<f64>,
    pub price_usd: Option<f64>,
}

impl InventoryStore {
    /// Mark every requested key sold to the buyer. Either all keys in
    /// the batch are sold with the identical timestamp or none are.
    ///
    /// Returns the updated records, in request order, for message and
    /// document generation.
    pub fn deliver(
        &mut self,
        request: &DeliveryRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<KeyRecord>, StoreError> {
        if request.buyer.trim().is_empty() {
            return Err(StoreError::EmptyBuyer);
        }
        validate_price(request.price_brl)?;
        validate_price(request.price_usd)?;

        for &id in &request.ids {
            let record = self.view().get(id).ok_or(StoreError::KeyNotFound(id))?;
            if !record.is_available() {
                return Err(StoreError::KeyNotAvailable(record.key.clone()));
            }
        }

        self.begin_mutation()?;

        let buyer = request.buyer.trim().to_string();
        let sold_at = encode_sold_at(now);
        let tx = self.conn_mut().transaction()?;
        if let Some(channel) = &request.channel {
            tx.execute(
                "INSERT OR IGNORE INTO channels (name) VALUES (?1)",
                [channel.as_str()],
            )?;
        }
        {
            let mut update = tx.prepare(
                "UPDATE keys SET sold = 1, buyer = ?1, sold_at = ?2,
                        price_brl = ?3, price_usd = ?4,
                        channel = COALESCE(?5, channel)
                 WHERE id = ?6",
            )?;
            for &id in &request.ids {
                update.execute(params![
                    buyer,
                    sold_at,
                    request.price_brl,
                    request.price_usd,
                    request.channel,
                    id,
                ])?;
            }
        }
        tx.commit()?;

        self.load_view()?;
        tracing::info!(keys = request.ids.len(), buyer = %buyer, "delivered keys");

        let mut delivered = Vec::with_capacity(request.ids.len());
        for &id in &request.ids {
            delivered.push(
                self.view()
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::KeyNotFound(id))?,
            );
        }
        Ok(delivered)
    }
}
