//! Tabular record contract shared by every entity type.

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A record that can be written as one CSV row.
///
/// `FIELDS` is the header row and must list the struct's serialized
/// fields in declaration order.
pub trait TabularRecord: Serialize {
    const FIELDS: &'static [&'static str];

    fn record_id(&self) -> Uuid;
}

/// Serialize a list column as one `;`-joined cell.
pub fn join_semicolon<S>(items: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&items.join(";"))
}
