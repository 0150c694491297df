//! `forgewms-catalog` — items, warehouses, locations, and replenishment
//! policies (pure data + validating constructors, no storage concerns).

pub mod item;
pub mod policy;
pub mod warehouse;

pub use item::{Item, ItemId};
pub use policy::ReplenishmentPolicy;
pub use warehouse::{Location, LocationId, LocationKind, Warehouse, WarehouseId};
