#![forbid(unsafe_code)]

//! Observable ordered sequence.
//!
//! # Design
//!
//! [`ObservableSeq<T>`] owns a dense `Vec<Option<T>>` (`None` is the absent
//! placeholder) and a private listener registry. Each mutating method
//! applies its collection effect first and then dispatches a
//! [`ChangeEvent`] twice: to listeners of the specific kind, then to
//! listeners of [`EventKind::Change`].
//!
//! Listeners are called with `(&ObservableSeq<T>, &ChangeEvent<T>)`. They can
//! read the sequence and even [`trigger`](ObservableSeq::trigger) on it, but
//! cannot mutate it from inside a dispatch.
//!
//! # Invariants
//!
//! 1. `len()` always equals the number of slots.
//! 2. A mutation that affects at least one slot dispatches exactly once to
//!    the specific kind and then exactly once to `change`, with one payload.
//! 3. A mutation that affects no slot dispatches nothing. An insert-only
//!    `splice` affects slots, so it dispatches `remove` with an empty payload.
//! 4. Listeners run in registration order, synchronously, on the caller's
//!    stack.
//! 5. Precondition failures ([`SeqError::InvalidArgument`]) leave the
//!    sequence untouched.
//!
//! # Failure Modes
//!
//! - **Listener error**: the mutation has already been applied when a
//!   fallible listener fails. The error is returned and the remaining
//!   listeners of the dispatch are skipped.
//! - **Panicking listener**: unwinds through the mutating call with the
//!   collection effect applied.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::config::SeqConfig;
use crate::error::{ListenerError, Result, SeqError};
use crate::event::{ChangeEvent, EventKind, EventTarget};
use crate::registry::{ListenerId, ListenerRegistry, Subscription};

/// Type-erased listener callback.
pub type Handler<T> =
    dyn Fn(&ObservableSeq<T>, &ChangeEvent<T>) -> std::result::Result<(), ListenerError>;

fn infallible<T, F>(
    handler: F,
) -> impl Fn(&ObservableSeq<T>, &ChangeEvent<T>) -> std::result::Result<(), ListenerError>
where
    F: Fn(&ObservableSeq<T>, &ChangeEvent<T>),
{
    move |seq, event| {
        handler(seq, event);
        Ok(())
    }
}

/// An ordered, indexable sequence that reports every mutation to its
/// listeners.
///
/// Reading goes through [`Deref`] to `[Option<T>]` plus the helpers below;
/// there is no `DerefMut`, so every write is observable.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use obseq::{EventKind, ObservableSeq, obseq};
///
/// let mut seq: ObservableSeq<i32> = obseq![3, 1, 2];
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// seq.on(EventKind::Change, move |_, event| sink.borrow_mut().push(event.clone()));
///
/// seq.sort().unwrap();
/// assert_eq!(seq.as_slice(), &[Some(1), Some(2), Some(3)]);
/// assert_eq!(seen.borrow().len(), 1);
/// assert_eq!(seen.borrow()[0].kind, EventKind::Update);
/// ```
pub struct ObservableSeq<T> {
    items: Vec<Option<T>>,
    listeners: ListenerRegistry<Handler<T>>,
    config: SeqConfig,
}

impl<T> Default for ObservableSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableSeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableSeq")
            .field("items", &self.items)
            .field("listeners", &self.listeners)
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Construction and reading
// ---------------------------------------------------------------------------

impl<T> ObservableSeq<T> {
    /// Create an empty sequence with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SeqConfig::default())
    }

    /// Create an empty sequence with a custom configuration.
    #[must_use]
    pub fn with_config(config: SeqConfig) -> Self {
        Self {
            items: Vec::new(),
            listeners: ListenerRegistry::new(),
            config,
        }
    }

    /// Create a sequence of `len` absent slots.
    pub fn with_len(len: usize) -> Result<Self> {
        Self::with_len_and_config(len, SeqConfig::default())
    }

    /// Create a sequence of `len` absent slots with a custom configuration.
    pub fn with_len_and_config(len: usize, config: SeqConfig) -> Result<Self> {
        config.check_len(len)?;
        let mut items = Vec::with_capacity(len);
        items.resize_with(len, || None);
        Ok(Self {
            items,
            listeners: ListenerRegistry::new(),
            config,
        })
    }

    /// Create a sequence from raw slots, absent ones included.
    #[must_use]
    pub fn from_slots(items: Vec<Option<T>>) -> Self {
        Self {
            items,
            listeners: ListenerRegistry::new(),
            config: SeqConfig::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> SeqConfig {
        self.config
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value at `index`, or `None` if the slot is absent or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Value at `index`, or `default` if the slot is absent or out of range.
    #[must_use]
    pub fn get_or<'a>(&'a self, index: usize, default: &'a T) -> &'a T {
        self.get(index).unwrap_or(default)
    }

    /// All slots as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.items
    }

    /// Present values in index order, skipping absent slots.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().flatten()
    }

    /// Consume the sequence, dropping its listeners.
    #[must_use]
    pub fn into_vec(self) -> Vec<Option<T>> {
        self.items
    }

    /// Number of live listeners for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.live_count(kind)
    }

    /// Remove a listener registered with [`on`](Self::on) or
    /// [`try_on`](Self::try_on). Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Remove every listener of every kind.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Deref for ObservableSeq<T> {
    type Target = [Option<T>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a ObservableSeq<T> {
    type Item = &'a Option<T>;
    type IntoIter = std::slice::Iter<'a, Option<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for ObservableSeq<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_slots(values.into_iter().map(Some).collect())
    }
}

impl<T> FromIterator<T> for ObservableSeq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_slots(iter.into_iter().map(Some).collect())
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ObservableSeq<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for ObservableSeq<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Option<T>>::deserialize(deserializer).map(Self::from_slots)
    }
}

// ---------------------------------------------------------------------------
// Listeners and dispatch
// ---------------------------------------------------------------------------

impl<T: 'static> ObservableSeq<T> {
    /// Register a listener for `kind`. The same callback may be registered
    /// more than once and then runs once per registration.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&Self, &ChangeEvent<T>) + 'static,
    {
        self.try_on(kind, infallible(handler))
    }

    /// Register a fallible listener for `kind`. An error returned by the
    /// listener aborts the dispatch and propagates to the caller.
    pub fn try_on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: Fn(&Self, &ChangeEvent<T>) -> std::result::Result<(), ListenerError> + 'static,
    {
        self.listeners.insert(kind, Rc::new(handler))
    }

    /// Register a listener for `kind` that stays registered only while the
    /// returned guard is alive.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Self, &ChangeEvent<T>) + 'static,
    {
        let strong: Rc<Handler<T>> = Rc::new(infallible(handler));
        let id = self.listeners.insert_weak(kind, Rc::downgrade(&strong));
        Subscription::new(id, kind, Box::new(strong))
    }

    /// Run the listeners of one or more event kinds with `payload`.
    ///
    /// A single kind with no live listeners fails with
    /// [`SeqError::MissingEventHandlers`]. A list of kinds skips the ones
    /// without listeners.
    pub fn trigger(&self, target: impl Into<EventTarget>, payload: &ChangeEvent<T>) -> Result<()> {
        let target = target.into();
        if let EventTarget::Single(kind) = target
            && self.listeners.live_count(kind) == 0
        {
            return Err(SeqError::MissingEventHandlers(kind));
        }
        self.dispatch(target.kinds(), payload)
    }

    fn dispatch(&self, kinds: &[EventKind], payload: &ChangeEvent<T>) -> Result<()> {
        for &kind in kinds {
            for handler in self.listeners.handlers(kind) {
                if let Err(source) = handler(self, payload) {
                    #[cfg(feature = "tracing")]
                    debug!(event = kind.as_str(), error = %source, "listener failed");
                    return Err(SeqError::Listener {
                        event: kind,
                        source,
                    });
                }
            }
            #[cfg(feature = "tracing")]
            trace!(
                event = kind.as_str(),
                payload = payload.kind.as_str(),
                items = payload.len(),
                handlers = self.listeners.live_count(kind),
                "dispatched"
            );
        }
        Ok(())
    }

    /// Report a mutation: the specific kind first, then `change`.
    fn emit(&mut self, event: ChangeEvent<T>) -> Result<()> {
        if event.is_empty() {
            #[cfg(feature = "tracing")]
            debug!(
                event = event.kind.as_str(),
                "mutation affected no items; dispatch suppressed"
            );
            return Ok(());
        }
        self.notify(event)
    }

    /// Report a mutation even when its payload is empty.
    fn notify(&mut self, event: ChangeEvent<T>) -> Result<()> {
        self.listeners.prune();
        self.dispatch(&[event.kind, EventKind::Change], &event)
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

impl<T: Clone + 'static> ObservableSeq<T> {
    /// Overwrite the slot at `index`, growing the sequence with absent slots
    /// if `index` is past the end. Fires `update`.
    pub fn set(&mut self, index: usize, value: T) -> Result<&mut Self> {
        self.config.check_index(index)?;
        if index >= self.items.len() {
            self.items.resize_with(index + 1, || None);
        }
        self.items[index] = Some(value.clone());
        self.emit(ChangeEvent::from_values(EventKind::Update, [value]))?;
        Ok(self)
    }

    /// Append values in order. Fires `insert` with the appended values and
    /// returns the new length.
    pub fn push(&mut self, values: impl IntoIterator<Item = T>) -> Result<usize> {
        self.insert_all(values.into_iter().map(Some))
    }

    /// Append a single value. Returns the new length.
    pub fn push_one(&mut self, value: T) -> Result<usize> {
        self.push(std::iter::once(value))
    }

    /// Append raw slots, absent ones included. Fires `insert` with the slots
    /// as given and returns the new length.
    pub fn insert_all(&mut self, slots: impl IntoIterator<Item = Option<T>>) -> Result<usize> {
        let slots: Vec<Option<T>> = slots.into_iter().collect();
        self.config
            .check_len(self.items.len().saturating_add(slots.len()))?;
        self.items.extend(slots.iter().cloned());
        self.emit(ChangeEvent::new(EventKind::Insert, slots))?;
        Ok(self.items.len())
    }

    /// Remove and return the last value. Fires `remove` unless the sequence
    /// was empty.
    pub fn pop(&mut self) -> Result<Option<T>> {
        let Some(removed) = self.items.pop() else {
            return Ok(None);
        };
        self.emit(ChangeEvent::new(EventKind::Remove, vec![removed.clone()]))?;
        Ok(removed)
    }

    /// Remove and return the first value. Fires `remove` unless the sequence
    /// was empty.
    pub fn shift(&mut self) -> Result<Option<T>> {
        if self.items.is_empty() {
            return Ok(None);
        }
        let removed = self.items.remove(0);
        self.emit(ChangeEvent::new(EventKind::Remove, vec![removed.clone()]))?;
        Ok(removed)
    }

    /// Prepend values, keeping their order. Fires `insert` with the inserted
    /// values and returns the new length.
    pub fn unshift(&mut self, values: impl IntoIterator<Item = T>) -> Result<usize> {
        let values: Vec<T> = values.into_iter().collect();
        self.config
            .check_len(self.items.len().saturating_add(values.len()))?;
        let tail = std::mem::take(&mut self.items);
        self.items = values.iter().cloned().map(Some).chain(tail).collect();
        self.emit(ChangeEvent::from_values(EventKind::Insert, values))?;
        Ok(self.items.len())
    }

    /// Reverse the order of the slots. Fires `update` with the full sequence.
    pub fn reverse(&mut self) -> Result<&mut Self> {
        self.items.reverse();
        self.emit(ChangeEvent::new(EventKind::Update, self.items.clone()))?;
        Ok(self)
    }

    /// Stable sort by a comparator. Absent slots move to the end and are
    /// never passed to `compare`. Fires `update` with the full sequence.
    pub fn sort_by<F>(&mut self, mut compare: F) -> Result<&mut Self>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => compare(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.emit(ChangeEvent::new(EventKind::Update, self.items.clone()))?;
        Ok(self)
    }

    /// Stable sort by a key extracted from each present value.
    pub fn sort_by_key<K, F>(&mut self, mut key: F) -> Result<&mut Self>
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.sort_by(|a, b| key(a).cmp(&key(b)))
    }

    /// Remove `delete_count` slots starting at `start` and insert `inserted`
    /// in their place. Both bounds clamp to the sequence. Fires `remove` with
    /// the removed slots and returns them. An insert-only splice still fires
    /// `remove`, with an empty payload; a splice that neither removes nor
    /// inserts fires nothing.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        inserted: impl IntoIterator<Item = T>,
    ) -> Result<Vec<Option<T>>> {
        let len = self.items.len();
        let start = start.min(len);
        let end = start + delete_count.min(len - start);
        let inserted: Vec<T> = inserted.into_iter().collect();
        let inserted_count = inserted.len();
        self.config
            .check_len((len - (end - start)).saturating_add(inserted_count))?;

        let removed: Vec<Option<T>> = self
            .items
            .splice(start..end, inserted.into_iter().map(Some))
            .collect();
        let event = ChangeEvent::new(EventKind::Remove, removed.clone());
        if removed.is_empty() && inserted_count > 0 {
            // Insert-only: contents changed, payload still lists removals.
            self.notify(event)?;
        } else {
            self.emit(event)?;
        }
        Ok(removed)
    }

    /// Replace each slot for which `handler(slot, index)` returns `Some`.
    /// Fires `update` with the written values in index order, or nothing if
    /// no slot was written.
    pub fn update_by<F>(&mut self, mut handler: F) -> Result<&mut Self>
    where
        F: FnMut(Option<&T>, usize) -> Option<T>,
    {
        let mut written = Vec::new();
        for (index, slot) in self.items.iter_mut().enumerate() {
            if let Some(value) = handler(slot.as_ref(), index) {
                written.push(Some(value.clone()));
                *slot = Some(value);
            }
        }
        self.emit(ChangeEvent::new(EventKind::Update, written))?;
        Ok(self)
    }

    /// Remove each slot for which `predicate(slot, index)` is true, keeping
    /// the rest in order. Fires `remove` with the removed slots in their
    /// original order, or nothing if none matched.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Result<&mut Self>
    where
        F: FnMut(Option<&T>, usize) -> bool,
    {
        let marks: Vec<bool> = self
            .items
            .iter()
            .enumerate()
            .map(|(index, slot)| predicate(slot.as_ref(), index))
            .collect();

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for (slot, remove) in std::mem::take(&mut self.items).into_iter().zip(marks) {
            if remove {
                removed.push(slot);
            } else {
                kept.push(slot);
            }
        }
        self.items = kept;

        self.emit(ChangeEvent::new(EventKind::Remove, removed))?;
        Ok(self)
    }
}

impl<T: Clone + Ord + 'static> ObservableSeq<T> {
    /// Stable sort in ascending order. Absent slots move to the end.
    pub fn sort(&mut self) -> Result<&mut Self> {
        self.sort_by(Ord::cmp)
    }
}
