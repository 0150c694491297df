//! Infrastructure layer: the stock engine, tenant-scoped stores, and the
//! operation services behind the HTTP boundary.

pub mod audit;
pub mod catalog;
pub mod counting;
pub mod putaway;
pub mod read_model;
pub mod receiving;
pub mod scanner;
pub mod shipping;
pub mod stock;
pub mod stock_ops;
pub mod tasks;
