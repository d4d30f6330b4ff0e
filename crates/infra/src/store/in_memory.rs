use std::collections::HashMap;
use std::sync::RwLock;

use super::record::{RecordKind, RowKey};
use super::{ReadSet, Scan, ShopStore, StoreError, Versioned, Write};

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<RowKey, Versioned>,
    /// Per kind, the version of the last commit that inserted or deleted a row.
    membership: HashMap<RecordKind, u64>,
    /// Last version handed out. Versions are never reused, even after a
    /// row is deleted and recreated.
    last_version: u64,
}

/// In-memory versioned store.
///
/// Intended for tests/dev. Commits serialize on a single write lock, which
/// makes the read-set check and the writes one atomic step.
#[derive(Debug, Default)]
pub struct InMemoryShopStore {
    tables: RwLock<Tables>,
}

impl InMemoryShopStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShopStore for InMemoryShopStore {
    fn read(&self, key: &RowKey) -> Result<Option<Versioned>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.rows.get(key).cloned())
    }

    fn scan(&self, kind: RecordKind) -> Result<Scan, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Scan {
            stamp: tables.membership.get(&kind).copied().unwrap_or(0),
            rows: tables
                .rows
                .iter()
                .filter(|(key, _)| key.kind() == kind)
                .map(|(key, row)| (*key, row.clone()))
                .collect(),
        })
    }

    fn commit(&self, reads: &ReadSet, writes: Vec<Write>) -> Result<(), StoreError> {
        let mut guard = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let Tables {
            rows,
            membership,
            last_version,
        } = &mut *guard;

        for (key, expected) in &reads.rows {
            expected
                .check(rows.get(key).map(|r| r.version))
                .map_err(|e| StoreError::Conflict(format!("{key:?}: {e}")))?;
        }
        for (kind, stamp) in &reads.scans {
            let actual = membership.get(kind).copied().unwrap_or(0);
            if actual != *stamp {
                return Err(StoreError::Conflict(format!(
                    "rows of {kind:?} were added or removed since listing"
                )));
            }
        }

        let version = *last_version + 1;
        *last_version = version;
        for (key, write) in writes {
            let reshaped = match write {
                Some(record) => rows.insert(key, Versioned { version, record }).is_none(),
                None => rows.remove(&key).is_some(),
            };
            if reshaped {
                membership.insert(key.kind(), version);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Transaction;
    use bloomshop_catalog::Flower;
    use bloomshop_core::FlowerId;

    fn flower(qty: u32) -> Flower {
        Flower {
            id: FlowerId::new(),
            name: "Peony".to_string(),
            price: "12.5".parse().unwrap(),
            total_quantity: qty,
        }
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = InMemoryShopStore::new();
        let f = flower(10);

        let mut tx = Transaction::begin(&store);
        tx.put(f.clone()).unwrap();
        assert_eq!(tx.get::<Flower>(f.id).unwrap(), Some(f.clone()));
        tx.commit().unwrap();

        let mut tx = Transaction::begin(&store);
        assert_eq!(tx.get::<Flower>(f.id).unwrap(), Some(f));
    }

    #[test]
    fn dropped_transaction_leaves_no_trace() {
        let store = InMemoryShopStore::new();
        let f = flower(10);
        {
            let mut tx = Transaction::begin(&store);
            tx.put(f.clone()).unwrap();
        }
        let mut tx = Transaction::begin(&store);
        assert_eq!(tx.get::<Flower>(f.id).unwrap(), None);
    }

    #[test]
    fn stale_read_conflicts() {
        let store = InMemoryShopStore::new();
        let f = flower(10);
        let mut seed = Transaction::begin(&store);
        seed.put(f.clone()).unwrap();
        seed.commit().unwrap();

        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        let mut a = first.get::<Flower>(f.id).unwrap().unwrap();
        let mut b = second.get::<Flower>(f.id).unwrap().unwrap();
        a.take(3).unwrap();
        b.take(4).unwrap();
        first.put(a).unwrap();
        second.put(b).unwrap();

        first.commit().unwrap();
        assert!(matches!(second.commit(), Err(StoreError::Conflict(_))));

        let mut tx = Transaction::begin(&store);
        assert_eq!(tx.get::<Flower>(f.id).unwrap().unwrap().total_quantity, 7);
    }

    #[test]
    fn concurrent_inserts_of_the_same_row_conflict() {
        let store = InMemoryShopStore::new();
        let f = flower(1);
        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        first.put(f.clone()).unwrap();
        second.put(f).unwrap();
        first.commit().unwrap();
        assert!(matches!(second.commit(), Err(StoreError::Conflict(_))));
    }

    #[test]
    fn insert_into_a_listed_kind_conflicts() {
        let store = InMemoryShopStore::new();
        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        assert!(first.list::<Flower>().unwrap().is_empty());
        assert!(second.list::<Flower>().unwrap().is_empty());

        first.put(flower(1)).unwrap();
        second.put(flower(2)).unwrap();
        first.commit().unwrap();
        assert!(matches!(second.commit(), Err(StoreError::Conflict(_))));

        let mut tx = Transaction::begin(&store);
        assert_eq!(tx.list::<Flower>().unwrap().len(), 1);
    }

    #[test]
    fn only_inserts_and_deletes_move_the_scan_stamp() {
        let store = InMemoryShopStore::new();
        let f = flower(5);
        let mut seed = Transaction::begin(&store);
        seed.put(f.clone()).unwrap();
        seed.commit().unwrap();
        let after_insert = store.scan(RecordKind::Flower).unwrap().stamp;
        assert_ne!(after_insert, 0);

        let mut tx = Transaction::begin(&store);
        let mut g = tx.get::<Flower>(f.id).unwrap().unwrap();
        g.restock(3);
        tx.put(g).unwrap();
        tx.commit().unwrap();
        assert_eq!(store.scan(RecordKind::Flower).unwrap().stamp, after_insert);
        assert_eq!(store.scan(RecordKind::Product).unwrap().stamp, 0);

        let mut tx = Transaction::begin(&store);
        tx.delete::<Flower>(f.id).unwrap();
        tx.commit().unwrap();
        assert!(store.scan(RecordKind::Flower).unwrap().stamp > after_insert);
    }

    #[test]
    fn list_applies_staged_writes() {
        let store = InMemoryShopStore::new();
        let kept = flower(1);
        let gone = flower(2);
        let mut seed = Transaction::begin(&store);
        seed.put(kept.clone()).unwrap();
        seed.put(gone.clone()).unwrap();
        seed.commit().unwrap();

        let mut tx = Transaction::begin(&store);
        tx.delete::<Flower>(gone.id).unwrap();
        let added = flower(3);
        tx.put(added.clone()).unwrap();

        let mut ids: Vec<_> = tx.list::<Flower>().unwrap().into_iter().map(|f| f.id).collect();
        ids.sort();
        let mut expected = vec![kept.id, added.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
