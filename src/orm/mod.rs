//! SeaORM entities for the two poll tables.

pub mod polls;
pub mod votes;
