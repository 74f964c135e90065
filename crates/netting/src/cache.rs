//! Per-debtor cache of fetched invoice and payment lists.
//!
//! After any compensation attempt the debtor's entries are marked stale so
//! the next read goes back to the backend for the remaining balances.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::document::SelectableDocument;
use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Invoices,
    Payments,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invoices => write!(f, "invoices"),
            Self::Payments => write!(f, "payments"),
        }
    }
}

/// Backend lists scoped to one debtor.
pub trait DocumentSource {
    fn list_invoices(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError>;
    fn list_payments(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError>;

    fn list(&self, debtor_id: &str, kind: ListKind) -> Result<Vec<SelectableDocument>, GatewayError> {
        match kind {
            ListKind::Invoices => self.list_invoices(debtor_id),
            ListKind::Payments => self.list_payments(debtor_id),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    docs: Vec<SelectableDocument>,
    stale: bool,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<(String, ListKind), Entry>,
    /// Bumped by every invalidation of a debtor.
    generations: HashMap<String, u64>,
}

impl Inner {
    fn generation(&self, debtor_id: &str) -> u64 {
        self.generations.get(debtor_id).copied().unwrap_or(0)
    }
}

/// Shared between a session and any submit still in flight for it.
#[derive(Debug, Default)]
pub struct DocumentCache {
    inner: Mutex<Inner>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list, if present and fresh.
    pub fn get(&self, debtor_id: &str, kind: ListKind) -> Option<Vec<SelectableDocument>> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(&(debtor_id.to_string(), kind))
            .filter(|e| !e.stale)
            .map(|e| e.docs.clone())
    }

    pub fn insert(&self, debtor_id: &str, kind: ListKind, docs: Vec<SelectableDocument>) {
        self.inner
            .lock()
            .entries
            .insert((debtor_id.to_string(), kind), Entry { docs, stale: false });
    }

    /// `None` if the list was never fetched.
    pub fn is_stale(&self, debtor_id: &str, kind: ListKind) -> Option<bool> {
        self.inner
            .lock()
            .entries
            .get(&(debtor_id.to_string(), kind))
            .map(|e| e.stale)
    }

    /// Mark both lists of a debtor stale.
    pub fn invalidate_debtor(&self, debtor_id: &str) {
        let mut inner = self.inner.lock();
        *inner.generations.entry(debtor_id.to_string()).or_insert(0) += 1;
        for ((debtor, _), entry) in inner.entries.iter_mut() {
            if debtor == debtor_id {
                entry.stale = true;
            }
        }
        log::debug!("invalidated cached lists for debtor {debtor_id}");
    }

    /// Return the cached list or fetch it. A failed fetch leaves the entry as it was.
    ///
    /// A list whose fetch overlapped an invalidation of the same debtor is
    /// returned but stored stale, so the next read fetches again.
    pub fn get_or_fetch(
        &self,
        source: &dyn DocumentSource,
        debtor_id: &str,
        kind: ListKind,
    ) -> Result<Vec<SelectableDocument>, GatewayError> {
        if let Some(docs) = self.get(debtor_id, kind) {
            return Ok(docs);
        }
        let generation = self.inner.lock().generation(debtor_id);
        log::debug!("fetching {kind} for debtor {debtor_id}");
        let docs = source.list(debtor_id, kind)?;

        let mut inner = self.inner.lock();
        let stale = inner.generation(debtor_id) != generation;
        if stale {
            log::debug!("{kind} for debtor {debtor_id} invalidated during fetch");
        }
        inner
            .entries
            .insert((debtor_id.to_string(), kind), Entry { docs: docs.clone(), stale });
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentType;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl DocumentSource for CountingSource {
        fn list_invoices(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(GatewayError::Network("connection refused".into()));
            }
            Ok(vec![SelectableDocument::new("i1", 100, debtor_id, DocumentType::Invoice)])
        }

        fn list_payments(&self, _debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    #[test]
    fn second_read_hits_cache() {
        let cache = DocumentCache::new();
        let src = CountingSource { calls: Cell::new(0), fail: false };
        cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap();
        let docs = cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(src.calls.get(), 1);
    }

    #[test]
    fn invalidation_forces_refetch() {
        let cache = DocumentCache::new();
        let src = CountingSource { calls: Cell::new(0), fail: false };
        cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap();
        cache.get_or_fetch(&src, "d1", ListKind::Payments).unwrap();
        cache.invalidate_debtor("d1");
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), Some(true));
        assert_eq!(cache.is_stale("d1", ListKind::Payments), Some(true));
        cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap();
        assert_eq!(src.calls.get(), 3);
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), Some(false));
    }

    #[test]
    fn invalidation_is_scoped_to_debtor() {
        let cache = DocumentCache::new();
        cache.insert("d1", ListKind::Invoices, Vec::new());
        cache.insert("d2", ListKind::Invoices, Vec::new());
        cache.invalidate_debtor("d1");
        assert_eq!(cache.is_stale("d2", ListKind::Invoices), Some(false));
        assert_eq!(cache.is_stale("d3", ListKind::Invoices), None);
    }

    /// Source that sees a compensation land while its request is in flight.
    struct RacingSource<'a> {
        cache: &'a DocumentCache,
    }

    impl DocumentSource for RacingSource<'_> {
        fn list_invoices(&self, debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
            let before = vec![SelectableDocument::new("i1", 100, debtor_id, DocumentType::Invoice)];
            self.cache.invalidate_debtor(debtor_id);
            Ok(before)
        }

        fn list_payments(&self, _debtor_id: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn invalidation_during_fetch_is_not_lost() {
        let cache = DocumentCache::new();
        let racing = RacingSource { cache: &cache };
        let docs = cache.get_or_fetch(&racing, "d1", ListKind::Invoices).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), Some(true));
        assert_eq!(cache.get("d1", ListKind::Invoices), None);

        let src = CountingSource { calls: Cell::new(0), fail: false };
        cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap();
        assert_eq!(src.calls.get(), 1);
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), Some(false));
    }

    #[test]
    fn other_debtor_invalidation_does_not_taint_fetch() {
        struct OtherDebtor<'a>(&'a DocumentCache);
        impl DocumentSource for OtherDebtor<'_> {
            fn list_invoices(&self, _: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
                self.0.invalidate_debtor("d2");
                Ok(Vec::new())
            }
            fn list_payments(&self, _: &str) -> Result<Vec<SelectableDocument>, GatewayError> {
                Ok(Vec::new())
            }
        }

        let cache = DocumentCache::new();
        cache.get_or_fetch(&OtherDebtor(&cache), "d1", ListKind::Invoices).unwrap();
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), Some(false));
    }

    #[test]
    fn failed_fetch_keeps_previous_entry() {
        let cache = DocumentCache::new();
        cache.insert("d1", ListKind::Payments, Vec::new());
        let src = CountingSource { calls: Cell::new(0), fail: true };
        let err = cache.get_or_fetch(&src, "d1", ListKind::Invoices).unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
        assert_eq!(cache.is_stale("d1", ListKind::Invoices), None);
        assert_eq!(cache.get("d1", ListKind::Payments), Some(Vec::new()));
    }
}
