use std::collections::HashMap;

use bloomshop_core::ExpectedVersion;

use super::record::{RecordKind, Row, RowKey};
use super::{ReadSet, Record, ShopStore, StoreError, Write};

/// Unit of work over a [`ShopStore`].
///
/// Reads observe the transaction's own staged writes first. Every row read
/// from the store is pinned to the version seen; [`Transaction::commit`]
/// fails with [`StoreError::Conflict`] if any pinned row moved. Listing a kind
/// also pins its membership, which makes checks like "no other row has this
/// name" hold at commit.
pub struct Transaction<'s, S: ShopStore + ?Sized> {
    store: &'s S,
    reads: HashMap<RowKey, ExpectedVersion>,
    scans: HashMap<RecordKind, u64>,
    writes: HashMap<RowKey, Option<Record>>,
    order: Vec<RowKey>,
}

impl<'s, S: ShopStore + ?Sized> Transaction<'s, S> {
    pub fn begin(store: &'s S) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            scans: HashMap::new(),
            writes: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn get<T: Row>(&mut self, id: T::Id) -> Result<Option<T>, StoreError> {
        let key = T::key_of(id);
        if let Some(staged) = self.writes.get(&key) {
            return Ok(staged.as_ref().and_then(T::from_record).cloned());
        }

        let row = self.store.read(&key)?;
        self.pin(key, row.as_ref().map(|r| r.version));
        Ok(row.as_ref().and_then(|r| T::from_record(&r.record)).cloned())
    }

    /// Every row of `T`, with staged writes applied.
    pub fn list<T: Row>(&mut self) -> Result<Vec<T>, StoreError> {
        let mut rows: HashMap<RowKey, T> = HashMap::new();
        let scan = self.store.scan(T::RECORD_KIND)?;
        self.scans.entry(T::RECORD_KIND).or_insert(scan.stamp);
        for (key, row) in scan.rows {
            self.pin(key, Some(row.version));
            if let Some(value) = T::from_record(&row.record) {
                rows.insert(key, value.clone());
            }
        }

        for (key, staged) in &self.writes {
            if key.kind() != T::RECORD_KIND {
                continue;
            }
            match staged.as_ref().and_then(T::from_record) {
                Some(value) => {
                    rows.insert(*key, value.clone());
                }
                None => {
                    rows.remove(key);
                }
            }
        }

        Ok(rows.into_values().collect())
    }

    /// Stage an insert or update of `value`.
    ///
    /// A row not read earlier is pinned to its current version (or to
    /// absence) so blind writes still conflict with concurrent ones.
    pub fn put<T: Row>(&mut self, value: T) -> Result<(), StoreError> {
        let key = value.row_key();
        self.observe(key)?;
        self.stage(key, Some(value.into_record()));
        Ok(())
    }

    pub fn delete<T: Row>(&mut self, id: T::Id) -> Result<(), StoreError> {
        let key = T::key_of(id);
        self.observe(key)?;
        self.stage(key, None);
        Ok(())
    }

    /// Validate the read set and apply every staged write atomically.
    pub fn commit(mut self) -> Result<(), StoreError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let reads = ReadSet {
            rows: self.reads.into_iter().collect(),
            scans: self.scans.into_iter().collect(),
        };
        let writes: Vec<Write> = self
            .order
            .into_iter()
            .filter_map(|key| self.writes.remove(&key).map(|w| (key, w)))
            .collect();
        self.store.commit(&reads, writes)
    }

    fn pin(&mut self, key: RowKey, version: Option<u64>) {
        self.reads.entry(key).or_insert(match version {
            Some(v) => ExpectedVersion::Exact(v),
            None => ExpectedVersion::Absent,
        });
    }

    fn observe(&mut self, key: RowKey) -> Result<(), StoreError> {
        if self.reads.contains_key(&key) || self.writes.contains_key(&key) {
            return Ok(());
        }
        let version = self.store.read(&key)?.map(|r| r.version);
        self.pin(key, version);
        Ok(())
    }

    fn stage(&mut self, key: RowKey, write: Option<Record>) {
        if self.writes.insert(key, write).is_none() {
            self.order.push(key);
        }
    }
}
