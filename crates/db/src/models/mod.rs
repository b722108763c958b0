//! Row types for every table, one module per table family.

pub mod figurine;
pub mod reference;
pub mod user;
