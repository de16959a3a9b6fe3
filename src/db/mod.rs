//! Database operations, one module per entity

pub mod customers;
pub mod orders;
pub mod products;
pub mod reports;
