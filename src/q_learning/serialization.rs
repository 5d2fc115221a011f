//! Versioned snapshot format for value tables.
//!
//! A snapshot is a MessagePack map `{ "version": u32, "states": { state
//! code: { action code: value } } }` with integer codes and keys in
//! ascending order, so equal tables always encode to equal bytes.

use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::value_table::ValueTable, types::BoardCode};

type StateEntries = BTreeMap<BoardCode, BTreeMap<BoardCode, f64>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedValueTable<'a> {
    pub version: u32,
    states: Cow<'a, StateEntries>,
}

impl<'a> SavedValueTable<'a> {
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &'a ValueTable) -> Self {
        Self {
            version: Self::VERSION,
            states: Cow::Borrowed(table.entries()),
        }
    }

    pub fn into_table(self) -> Result<ValueTable> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(ValueTable::from_entries(self.states.into_owned()))
    }
}

impl ValueTable {
    /// Encode the table as a versioned snapshot
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(&SavedValueTable::from_table(self)).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize value table to MessagePack".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Decode a versioned snapshot
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let saved: SavedValueTable<'static> =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize value table from MessagePack".to_string(),
                message: e.to_string(),
            })?;
        saved.into_table()
    }
}
