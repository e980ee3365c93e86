//! In-process versioned ledger with optimistic concurrency control.
//!
//! Every key keeps its full list of committed versions. A [`LedgerTx`]
//! reads committed state, remembers the version of each key it read and
//! buffers its writes. On commit the read set is validated against the
//! store: if another transaction committed any of those keys in the
//! meantime the whole transaction is rejected with
//! [`LedgerError::Conflict`] and nothing is written.

use super::snapshot::{LedgerSnapshot, SnapshotError, VersionRecord, SNAPSHOT_VERSION};
use super::{KeyModification, KeyValue, Ledger, LedgerError};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    keys: BTreeMap<String, Vec<VersionRecord>>,
    /// Sequence number of the last commit
    sequence: u64,
    last_commit: Option<DateTime<Utc>>,
}

impl Store {
    /// Version of the newest committed change, 0 if never written.
    fn current_version(&self, key: &str) -> u64 {
        self.keys
            .get(key)
            .and_then(|versions| versions.last())
            .map_or(0, |v| v.version)
    }

    fn live_value(&self, key: &str) -> Option<&Vec<u8>> {
        self.keys
            .get(key)
            .and_then(|versions| versions.last())
            .and_then(|v| v.value.as_ref())
    }

    /// Commit timestamps never go backwards, even if the wall clock does.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_commit {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_commit = Some(timestamp);
        timestamp
    }
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    cursor_fault_after: Mutex<Option<usize>>,
}

/// Shared handle to an in-memory ledger.
///
/// Clones share the same store.
///
/// ```rust
/// use bookledger::ledger::{Ledger, LedgerError, MemoryLedger};
///
/// let ledger = MemoryLedger::new();
/// ledger
///     .submit(|tx| tx.put_state("k", b"v".to_vec()))
///     .unwrap();
///
/// let value = ledger.evaluate(|tx| tx.get_state("k")).unwrap();
/// assert_eq!(value, Some(b"v".to_vec()));
/// # Ok::<(), LedgerError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    store: Arc<RwLock<Store>>,
    faults: Arc<Faults>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MemoryLedgerBuilder {
        MemoryLedgerBuilder::new()
    }

    /// Open a transaction with a fresh id.
    pub fn begin(&self) -> LedgerTx {
        LedgerTx {
            ledger: self.clone(),
            tx_id: Uuid::new_v4().simple().to_string(),
            read_set: Mutex::new(BTreeMap::new()),
            writes: BTreeMap::new(),
        }
    }

    /// Run `f` in a new transaction, committing only if it succeeds.
    pub fn submit<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerTx) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut tx = self.begin();
        let output = f(&mut tx)?;
        tx.commit()?;
        Ok(output)
    }

    /// Run `f` against a transaction that is never committed.
    pub fn evaluate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&LedgerTx) -> Result<T, E>,
    {
        let tx = self.begin();
        f(&tx)
    }

    /// Make every operation fail with [`LedgerError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make cursors opened from now on fail after yielding `n` items.
    pub fn fail_cursors_after(&self, n: Option<usize>) {
        *self.faults.cursor_fault_after.lock() = n;
    }

    /// Number of cursors not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Committed bytes of `key`, bypassing transactions.
    pub fn committed_value(&self, key: &str) -> Option<Vec<u8>> {
        self.store.read().live_value(key).cloned()
    }

    /// Copy the full versioned contents of the ledger.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let store = self.store.read();
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            sequence: store.sequence,
            last_commit: store.last_commit,
            keys: store.keys.clone(),
        }
    }

    /// Build a new ledger holding the contents of `snapshot`.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, SnapshotError> {
        snapshot.check()?;
        let store = Store {
            keys: snapshot.keys,
            sequence: snapshot.sequence,
            last_commit: snapshot.last_commit,
        };
        debug!(snapshot_id = %snapshot.id, keys = store.keys.len(), "restored ledger snapshot");
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            ..Self::default()
        })
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            Err(LedgerError::Unavailable("ledger marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn open_cursor<T>(&self, items: Vec<T>) -> Cursor<T> {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Cursor {
            items: items.into_iter(),
            yielded: 0,
            fail_after: *self.faults.cursor_fault_after.lock(),
            failed: false,
            _release: CursorRelease(Arc::clone(&self.open_cursors)),
        }
    }
}

/// Builder for a [`MemoryLedger`] with faults preset.
#[derive(Debug, Default)]
pub struct MemoryLedgerBuilder {
    unavailable: bool,
    cursor_fault_after: Option<usize>,
}

impl MemoryLedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(mut self, unavailable: bool) -> Self {
        self.unavailable = unavailable;
        self
    }

    pub fn fail_cursors_after(mut self, n: usize) -> Self {
        self.cursor_fault_after = Some(n);
        self
    }

    pub fn build(self) -> MemoryLedger {
        let ledger = MemoryLedger::new();
        ledger.set_unavailable(self.unavailable);
        ledger.fail_cursors_after(self.cursor_fault_after);
        ledger
    }
}

/// Outcome of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_id: String,
    pub committed_at: DateTime<Utc>,
    /// Keys written, in key order
    pub keys: Vec<String>,
}

/// One transaction against a [`MemoryLedger`].
///
/// Reads see committed state only, not the transaction's own buffered
/// writes. Dropping the transaction without committing discards it.
#[derive(Debug)]
pub struct LedgerTx {
    ledger: MemoryLedger,
    tx_id: String,
    read_set: Mutex<BTreeMap<String, u64>>,
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl LedgerTx {
    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Buffer a delete marker for `key`.
    pub fn delete_state(&mut self, key: &str) -> Result<(), LedgerError> {
        self.ledger.check_available()?;
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    /// Validate the read set and apply all buffered writes atomically.
    pub fn commit(self) -> Result<TxReceipt, LedgerError> {
        self.ledger.check_available()?;
        let read_set = self.read_set.into_inner();
        let mut store = self.ledger.store.write();

        for (key, read_version) in &read_set {
            if store.current_version(key) != *read_version {
                warn!(tx_id = %self.tx_id, key = %key, "transaction rejected: read conflict");
                return Err(LedgerError::Conflict { key: key.clone() });
            }
        }

        let committed_at = store.next_timestamp();
        if self.writes.is_empty() {
            return Ok(TxReceipt {
                tx_id: self.tx_id,
                committed_at,
                keys: Vec::new(),
            });
        }

        store.sequence += 1;
        let version = store.sequence;
        let mut keys = Vec::with_capacity(self.writes.len());
        for (key, value) in self.writes {
            store
                .keys
                .entry(key.clone())
                .or_default()
                .push(VersionRecord {
                    version,
                    tx_id: self.tx_id.clone(),
                    timestamp: committed_at,
                    value,
                });
            keys.push(key);
        }

        debug!(tx_id = %self.tx_id, version, keys = keys.len(), "transaction committed");
        Ok(TxReceipt {
            tx_id: self.tx_id,
            committed_at,
            keys,
        })
    }
}

impl Ledger for LedgerTx {
    type Range = RangeCursor;
    type History = HistoryCursor;

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        self.ledger.check_available()?;
        let store = self.ledger.store.read();
        self.read_set
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| store.current_version(key));
        Ok(store.live_value(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.ledger.check_available()?;
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<RangeCursor, LedgerError> {
        self.ledger.check_available()?;
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        // BTreeMap::range panics on an inverted range
        let inverted = !start.is_empty() && !end.is_empty() && start >= end;

        let store = self.ledger.store.read();
        let items = if inverted {
            Vec::new()
        } else {
            store
                .keys
                .range::<str, _>((lower, upper))
                .filter_map(|(key, versions)| {
                    let value = versions.last()?.value.as_ref()?;
                    Some(KeyValue {
                        key: key.clone(),
                        value: value.clone(),
                    })
                })
                .collect()
        };
        Ok(self.ledger.open_cursor(items))
    }

    fn get_history_for_key(&self, key: &str) -> Result<HistoryCursor, LedgerError> {
        self.ledger.check_available()?;
        let store = self.ledger.store.read();
        let items = store
            .keys
            .get(key)
            .map(|versions| {
                versions
                    .iter()
                    .map(|v| {
                        Ok(KeyModification {
                            tx_id: v.tx_id.clone(),
                            timestamp_nanos: v
                                .timestamp
                                .timestamp_nanos_opt()
                                .ok_or(LedgerError::Clock)?,
                            value: v.value.clone().unwrap_or_default(),
                            is_delete: v.value.is_none(),
                        })
                    })
                    .collect::<Result<Vec<_>, LedgerError>>()
            })
            .transpose()?
            .unwrap_or_default();
        Ok(self.ledger.open_cursor(items))
    }
}

/// Decrements the open-cursor count when the cursor goes away.
#[derive(Debug)]
struct CursorRelease(Arc<AtomicUsize>);

impl Drop for CursorRelease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Materialized cursor over ledger items.
///
/// After an injected fault the cursor yields one error and then ends.
#[derive(Debug)]
pub struct Cursor<T> {
    items: std::vec::IntoIter<T>,
    yielded: usize,
    fail_after: Option<usize>,
    failed: bool,
    _release: CursorRelease,
}

pub type RangeCursor = Cursor<KeyValue>;
pub type HistoryCursor = Cursor<KeyModification>;

impl<T> Iterator for Cursor<T> {
    type Item = Result<T, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.fail_after == Some(self.yielded) && !self.items.as_slice().is_empty() {
            self.failed = true;
            return Some(Err(LedgerError::Cursor(format!(
                "injected fault after {} items",
                self.yielded
            ))));
        }
        let item = self.items.next()?;
        self.yielded += 1;
        Some(Ok(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(ledger: &MemoryLedger, key: &str, value: &str) -> TxReceipt {
        let mut tx = ledger.begin();
        tx.put_state(key, value.as_bytes().to_vec()).unwrap();
        tx.commit().unwrap()
    }

    #[test]
    fn missing_key_reads_as_none() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        assert_eq!(tx.get_state("nope").unwrap(), None);
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin();
        tx.put_state("k", b"v".to_vec()).unwrap();

        assert_eq!(tx.get_state("k").unwrap(), None);
        assert_eq!(ledger.committed_value("k"), None);

        tx.commit().unwrap();
        assert_eq!(ledger.committed_value("k"), Some(b"v".to_vec()));
    }

    #[test]
    fn dropped_transaction_writes_nothing() {
        let ledger = MemoryLedger::new();
        {
            let mut tx = ledger.begin();
            tx.put_state("k", b"v".to_vec()).unwrap();
        }
        assert_eq!(ledger.committed_value("k"), None);
    }

    #[test]
    fn stale_read_conflicts_at_commit() {
        let ledger = MemoryLedger::new();
        put(&ledger, "k", "v1");

        let mut first = ledger.begin();
        let mut second = ledger.begin();
        first.get_state("k").unwrap();
        second.get_state("k").unwrap();
        first.put_state("k", b"v2".to_vec()).unwrap();
        second.put_state("k", b"v3".to_vec()).unwrap();

        first.commit().unwrap();
        assert_eq!(
            second.commit(),
            Err(LedgerError::Conflict {
                key: "k".to_string()
            })
        );
        assert_eq!(ledger.committed_value("k"), Some(b"v2".to_vec()));
    }

    #[test]
    fn absent_read_conflicts_with_concurrent_insert() {
        let ledger = MemoryLedger::new();

        let mut tx = ledger.begin();
        assert_eq!(tx.get_state("k").unwrap(), None);
        put(&ledger, "k", "other");
        tx.put_state("k", b"mine".to_vec()).unwrap();

        assert!(matches!(tx.commit(), Err(LedgerError::Conflict { .. })));
    }

    #[test]
    fn range_is_ordered_and_half_open() {
        let ledger = MemoryLedger::new();
        for key in ["c", "a", "d", "b"] {
            put(&ledger, key, key);
        }

        let tx = ledger.begin();
        let all: Vec<String> = tx
            .get_state_by_range("", "")
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(all, vec!["a", "b", "c", "d"]);

        let slice: Vec<String> = tx
            .get_state_by_range("b", "d")
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(slice, vec!["b", "c"]);

        assert_eq!(tx.get_state_by_range("d", "a").unwrap().count(), 0);
    }

    #[test]
    fn deleted_keys_leave_reads_but_stay_in_history() {
        let ledger = MemoryLedger::new();
        put(&ledger, "k", "v1");
        let mut tx = ledger.begin();
        tx.delete_state("k").unwrap();
        tx.commit().unwrap();

        let tx = ledger.begin();
        assert_eq!(tx.get_state("k").unwrap(), None);
        assert_eq!(tx.get_state_by_range("", "").unwrap().count(), 0);

        let history: Vec<KeyModification> = tx
            .get_history_for_key("k")
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_delete);
        assert!(history[1].is_delete);
        assert!(history[1].value.is_empty());
    }

    #[test]
    fn history_has_distinct_ids_and_ordered_timestamps() {
        let ledger = MemoryLedger::new();
        let receipts: Vec<TxReceipt> = (0..5).map(|i| put(&ledger, "k", &i.to_string())).collect();

        let tx = ledger.begin();
        let history: Vec<KeyModification> = tx
            .get_history_for_key("k")
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(history.len(), 5);
        for (entry, receipt) in history.iter().zip(&receipts) {
            assert_eq!(entry.tx_id, receipt.tx_id);
        }
        assert!(history
            .windows(2)
            .all(|w| w[0].timestamp_nanos <= w[1].timestamp_nanos));
    }

    #[test]
    fn unavailable_ledger_fails_every_operation() {
        let ledger = MemoryLedger::builder().unavailable(true).build();
        let mut tx = ledger.begin();

        assert!(matches!(tx.get_state("k"), Err(LedgerError::Unavailable(_))));
        assert!(matches!(
            tx.put_state("k", Vec::new()),
            Err(LedgerError::Unavailable(_))
        ));
        assert!(tx.get_state_by_range("", "").is_err());
        assert!(tx.get_history_for_key("k").is_err());
        assert!(matches!(tx.commit(), Err(LedgerError::Unavailable(_))));
    }

    #[test]
    fn cursors_release_on_drop() {
        let ledger = MemoryLedger::new();
        put(&ledger, "k", "v");
        let tx = ledger.begin();

        let range = tx.get_state_by_range("", "").unwrap();
        let history = tx.get_history_for_key("k").unwrap();
        assert_eq!(ledger.open_cursors(), 2);

        drop(range);
        drop(history);
        assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn injected_cursor_fault_yields_one_error() {
        let ledger = MemoryLedger::new();
        for key in ["a", "b", "c"] {
            put(&ledger, key, key);
        }
        ledger.fail_cursors_after(Some(1));

        let tx = ledger.begin();
        let items: Vec<Result<KeyValue, LedgerError>> =
            tx.get_state_by_range("", "").unwrap().collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(LedgerError::Cursor(_))));
    }

    #[test]
    fn submit_discards_on_error() {
        let ledger = MemoryLedger::new();
        let result: Result<(), LedgerError> = ledger.submit(|tx| {
            tx.put_state("k", b"v".to_vec())?;
            Err(LedgerError::Cursor("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(ledger.committed_value("k"), None);
    }
}
