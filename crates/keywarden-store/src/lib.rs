// ABOUTME: Persistence layer for keywarden: the SQLite inventory store and everything around it.
// ABOUTME: Migrations, snapshot undo/redo, the delivery transaction, registries, export, backup.

pub mod backup;
pub mod delivery;
pub mod error;
pub mod export;
pub mod inventory;
pub mod migrate;
pub mod registry;
pub mod snapshot;

pub use delivery::DeliveryRequest;
pub use error::StoreError;
pub use inventory::{
    AddOutcome, ChannelFilter, InventoryStore, InventoryView, KeyFilter, KeyUpdate, StatusFilter,
};
pub use snapshot::{SnapshotError, SnapshotSlots, UndoState};
