//! SeaORM entities for the message log.

pub mod messages;
