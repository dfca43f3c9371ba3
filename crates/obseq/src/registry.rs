#![forbid(unsafe_code)]

//! Per-instance listener registry.
//!
//! # Design
//!
//! Listeners are kept in one ordered table per [`EventKind`]. A table entry
//! either owns its callback (`on`/`try_on`, removed explicitly with
//! [`ListenerId`]) or holds it weakly behind a [`Subscription`] guard, in
//! which case dropping the guard is the unsubscribe. Dead weak entries are
//! pruned lazily, before the next dispatch.
//!
//! # Invariants
//!
//! 1. Within a table, iteration order is registration order.
//! 2. Identical callbacks registered twice are two entries and run twice.
//! 3. A removed or dropped listener is never yielded by `handlers`.
//! 4. Ids are unique per registry and never reused.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::EventKind;

/// Handle returned by registration, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

enum Slot<F: ?Sized> {
    Owned(Rc<F>),
    Guarded(Weak<F>),
}

struct Entry<F: ?Sized> {
    id: ListenerId,
    slot: Slot<F>,
}

impl<F: ?Sized> Entry<F> {
    fn upgrade(&self) -> Option<Rc<F>> {
        match &self.slot {
            Slot::Owned(cb) => Some(Rc::clone(cb)),
            Slot::Guarded(weak) => weak.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match &self.slot {
            Slot::Owned(_) => true,
            Slot::Guarded(weak) => weak.strong_count() > 0,
        }
    }
}

/// Ordered listener tables, one per event kind.
pub(crate) struct ListenerRegistry<F: ?Sized> {
    tables: [Vec<Entry<F>>; EventKind::COUNT],
    next_id: u64,
}

impl<F: ?Sized> Default for ListenerRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for ListenerRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            map.entry(&kind.as_str(), &self.live_count(kind));
        }
        map.finish()
    }
}

impl<F: ?Sized> ListenerRegistry<F> {
    pub(crate) fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| Vec::new()),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an owned callback to `kind`'s table.
    pub(crate) fn insert(&mut self, kind: EventKind, callback: Rc<F>) -> ListenerId {
        let id = self.next_id();
        self.tables[kind.slot()].push(Entry {
            id,
            slot: Slot::Owned(callback),
        });
        id
    }

    /// Append a weakly held callback to `kind`'s table.
    pub(crate) fn insert_weak(&mut self, kind: EventKind, callback: Weak<F>) -> ListenerId {
        let id = self.next_id();
        self.tables[kind.slot()].push(Entry {
            id,
            slot: Slot::Guarded(callback),
        });
        id
    }

    /// Remove the listener with `id`, wherever it is registered.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        for table in &mut self.tables {
            if let Some(pos) = table.iter().position(|entry| entry.id == id) {
                table.remove(pos);
                return true;
            }
        }
        false
    }

    /// Drop entries whose [`Subscription`] guard is gone.
    pub(crate) fn prune(&mut self) {
        for table in &mut self.tables {
            table.retain(Entry::is_live);
        }
    }

    /// Remove every listener.
    pub(crate) fn clear(&mut self) {
        for table in &mut self.tables {
            table.clear();
        }
    }

    /// Live callbacks for `kind`, in registration order.
    pub(crate) fn handlers(&self, kind: EventKind) -> impl Iterator<Item = Rc<F>> + '_ {
        self.tables[kind.slot()].iter().filter_map(Entry::upgrade)
    }

    /// Number of live callbacks for `kind`.
    pub(crate) fn live_count(&self, kind: EventKind) -> usize {
        self.tables[kind.slot()]
            .iter()
            .filter(|entry| entry.is_live())
            .count()
    }

    /// Number of entries for `kind`, including dead ones not yet pruned.
    #[cfg(test)]
    pub(crate) fn entry_count(&self, kind: EventKind) -> usize {
        self.tables[kind.slot()].len()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a listener registered with
/// [`ObservableSeq::subscribe`](crate::ObservableSeq::subscribe).
///
/// Dropping the guard drops the only strong reference to the callback, so
/// the weak entry in the registry stops upgrading immediately and is pruned
/// before the next dispatch.
pub struct Subscription {
    id: ListenerId,
    kind: EventKind,
    /// Type-erased strong reference keeping the callback alive.
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, kind: EventKind, guard: Box<dyn Any>) -> Self {
        Self {
            id,
            kind,
            _guard: guard,
        }
    }

    /// Id of the guarded listener.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Event kind the guarded listener is registered for.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
