//! Derived entities
//!
//! Every record is a JSON document addressed by its entity name and id; the
//! typed access goes through `Table<T>`.

mod models;
mod table;

pub use models::*;
pub use table::{Entity, Table};
