#![forbid(unsafe_code)]

//! Event vocabulary and change payloads.
//!
//! Every mutation of an [`ObservableSeq`](crate::ObservableSeq) is reported
//! as a [`ChangeEvent`]: the specific kind (`insert`, `remove`, `update`)
//! plus the affected slots. The same payload is delivered twice per
//! mutation, first to listeners of the specific kind and then to listeners
//! of the generic [`EventKind::Change`].
//!
//! # Invariants
//!
//! 1. The vocabulary is closed: four kinds, each with a stable lowercase name.
//! 2. A payload's `items` preserve the order the mutation reports them in.
//! 3. Absent slots are carried as `None`, never dropped from `items`.

use std::fmt;
use std::str::FromStr;

use crate::error::SeqError;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Name of a dispatchable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EventKind {
    /// Generic event, fired after every specific event.
    Change,
    /// Values were added.
    Insert,
    /// Values were taken out.
    Remove,
    /// Values were overwritten or reordered in place.
    Update,
}

impl EventKind {
    /// All kinds, in registry slot order.
    pub const ALL: [Self; 4] = [Self::Change, Self::Insert, Self::Remove, Self::Update];

    /// Number of kinds in the vocabulary.
    pub const COUNT: usize = Self::ALL.len();

    /// Lowercase event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }

    /// Slot of this kind in per-kind tables.
    #[must_use]
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Change => 0,
            Self::Insert => 1,
            Self::Remove => 2,
            Self::Update => 3,
        }
    }

    /// Returns true for the generic [`EventKind::Change`].
    #[must_use]
    pub const fn is_generic(self) -> bool {
        matches!(self, Self::Change)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SeqError::invalid(format!("unknown event name '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// Payload delivered to listeners: what happened and which slots it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeEvent<T> {
    /// The specific kind of mutation.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: EventKind,
    /// Affected slots. `None` marks an absent slot.
    pub items: Vec<Option<T>>,
}

impl<T> ChangeEvent<T> {
    /// Create a payload from raw slots.
    #[must_use]
    pub fn new(kind: EventKind, items: Vec<Option<T>>) -> Self {
        Self { kind, items }
    }

    /// Create a payload whose slots are all present.
    #[must_use]
    pub fn from_values(kind: EventKind, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            kind,
            items: values.into_iter().map(Some).collect(),
        }
    }

    /// Create a payload with no items.
    #[must_use]
    pub fn empty(kind: EventKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Number of affected slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no slot was affected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the present values, skipping absent slots.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// EventTarget
// ---------------------------------------------------------------------------

/// The event name(s) passed to [`ObservableSeq::trigger`](crate::ObservableSeq::trigger).
///
/// The two forms differ when a name has no listeners: a single name is an
/// error, a list skips that name and carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget {
    /// One name; fails if it has no live listeners.
    Single(EventKind),
    /// Several names dispatched in order; names without listeners are skipped.
    List(Vec<EventKind>),
}

impl EventTarget {
    /// The kinds to dispatch, in order.
    #[must_use]
    pub fn kinds(&self) -> &[EventKind] {
        match self {
            Self::Single(kind) => std::slice::from_ref(kind),
            Self::List(kinds) => kinds,
        }
    }

    /// True for the single-name form.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

impl From<EventKind> for EventTarget {
    fn from(kind: EventKind) -> Self {
        Self::Single(kind)
    }
}

impl<const N: usize> From<[EventKind; N]> for EventTarget {
    fn from(kinds: [EventKind; N]) -> Self {
        Self::List(kinds.to_vec())
    }
}

impl From<&[EventKind]> for EventTarget {
    fn from(kinds: &[EventKind]) -> Self {
        Self::List(kinds.to_vec())
    }
}

impl From<Vec<EventKind>> for EventTarget {
    fn from(kinds: Vec<EventKind>) -> Self {
        Self::List(kinds)
    }
}
