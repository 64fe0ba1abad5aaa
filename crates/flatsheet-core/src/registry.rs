//! Shared-formula registry
//!
//! Maps each shared-formula group id to the host cell that carried the
//! literal formula text. Scoped to a single worksheet pass: group ids are
//! not unique across worksheets, so a fresh registry is built per sheet.

use crate::address::CellAddress;
use crate::error::{Error, Result};
use ahash::AHashMap;

/// One registry entry: the host side of a shared-formula group
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFormulaEntry {
    /// Group id (the `si` attribute)
    pub group_id: u32,
    /// Address of the host cell
    pub host_address: CellAddress,
    /// The host's literal formula text
    pub formula: String,
}

/// Worksheet-scoped collection of shared-formula hosts
///
/// Populated while classifying a worksheet's cells, read-only afterwards.
/// Exactly one host per group: a second insert for the same id is an error,
/// never an overwrite.
#[derive(Debug, Default)]
pub struct SharedFormulaRegistry {
    entries: AHashMap<u32, SharedFormulaEntry>,
}

impl SharedFormulaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the host of a shared-formula group
    pub fn insert(
        &mut self,
        group_id: u32,
        host_address: CellAddress,
        formula: String,
    ) -> Result<()> {
        if self.entries.contains_key(&group_id) {
            return Err(Error::DuplicateSharedGroup {
                group_id,
                address: host_address.to_a1_string(),
            });
        }
        self.entries.insert(
            group_id,
            SharedFormulaEntry {
                group_id,
                host_address,
                formula,
            },
        );
        Ok(())
    }

    /// Look up the host entry for a group
    pub fn get(&self, group_id: u32) -> Option<&SharedFormulaEntry> {
        self.entries.get(&group_id)
    }

    /// Number of registered groups
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no host has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
