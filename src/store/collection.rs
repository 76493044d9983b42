// SecretCLI — Ordered secret collection
//
// Records live in an arena keyed by their stable UUID; a separate order
// vector gives the user-facing position. The index is always derived from
// the order vector, so it stays dense ({0 … len-1}) across deletions.

use std::collections::HashMap;

use uuid::Uuid;

use super::models::SecretRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretCollection {
    order: Vec<Uuid>,
    records: HashMap<Uuid, SecretRecord>,
}

impl SecretCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records. Returns the offending id on a duplicate.
    pub fn from_records(records: Vec<SecretRecord>) -> std::result::Result<Self, Uuid> {
        let mut collection = Self::new();
        for record in records {
            if collection.records.contains_key(&record.id) {
                return Err(record.id);
            }
            collection.push(record);
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SecretRecord> {
        self.order.get(index).and_then(|id| self.records.get(id))
    }

    /// Current position of a record, by its stable id.
    pub fn position_of(&self, id: &Uuid) -> Option<usize> {
        self.order.iter().position(|candidate| candidate == id)
    }

    /// Records in order, paired with their current index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SecretRecord)> + '_ {
        self.order
            .iter()
            .enumerate()
            .filter_map(move |(index, id)| self.records.get(id).map(|record| (index, record)))
    }

    /// Append at the end; returns the new index.
    pub fn push(&mut self, record: SecretRecord) -> usize {
        self.order.push(record.id);
        self.records.insert(record.id, record);
        self.order.len() - 1
    }

    /// Order-preserving removal. Caller guarantees `index < len`.
    pub(crate) fn remove(&mut self, index: usize) -> Option<SecretRecord> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.records.remove(&id)
    }

    /// Swap in a new record at `index`, keeping the slot's identity and
    /// creation time. Returns the previous record.
    pub(crate) fn replace(&mut self, index: usize, mut record: SecretRecord) -> Option<SecretRecord> {
        let id = *self.order.get(index)?;
        let previous = self.records.remove(&id)?;
        record.id = id;
        record.created_at = previous.created_at;
        self.records.insert(id, record);
        Some(previous)
    }

    /// Records in order, for persistence.
    pub fn to_records(&self) -> Vec<SecretRecord> {
        self.iter().map(|(_, record)| record.clone()).collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
