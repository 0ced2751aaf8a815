//! Inventory domain module.
//!
//! Stock items and the rule deriving their alert status from stock levels,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{
    InventoryItem, InventoryPatch, InventoryStatus, NewInventoryItem, inventory_status,
};
