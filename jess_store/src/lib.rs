#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Message Store implementations.
//!
//! - [`SqliteMessageStore`] persists the log in a SQLite database through SeaORM.
//! - [`MemoryMessageStore`] keeps it in process memory.

mod convert;
mod memory;
mod sqlite;

pub use jess_core::MessageStore;
pub use memory::MemoryMessageStore;
pub use sqlite::SqliteMessageStore;
