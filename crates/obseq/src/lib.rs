#![forbid(unsafe_code)]

//! Observable ordered sequence.
//!
//! # Role
//! `obseq` provides [`ObservableSeq<T>`], an indexable ordered collection
//! that notifies registered listeners whenever its contents change. UI
//! bindings and derived-state caches subscribe to it instead of polling or
//! diffing.
//!
//! # Primary responsibilities
//! - **ObservableSeq**: storage, construction, indexed access and the
//!   mutation family (`push`, `pop`, `shift`, `unshift`, `splice`, `sort`,
//!   `reverse`, `set`, `insert_all`, `update_by`, `remove_where`).
//! - **Dispatch**: every mutation that touches at least one slot is reported
//!   as a [`ChangeEvent`] to listeners of its specific [`EventKind`] and then
//!   to listeners of [`EventKind::Change`].
//! - **Registry**: per-instance listener tables with explicit removal
//!   ([`ListenerId`]) or RAII removal ([`Subscription`]).
//!
//! # Feature flags
//! - `tracing`: structured logs for dispatch, suppression and listener
//!   failures.
//! - `serde`: `Serialize`/`Deserialize` for payloads and sequence slots.

pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod sequence;

pub use config::{DEFAULT_MAX_LEN, SeqConfig};
pub use error::{ListenerError, Result, SeqError};
pub use event::{ChangeEvent, EventKind, EventTarget};
pub use registry::{ListenerId, Subscription};
pub use sequence::{Handler, ObservableSeq};

/// Build an [`ObservableSeq`] from a list of values.
///
/// ```
/// use obseq::obseq;
///
/// let seq = obseq![1, 2, 3];
/// assert_eq!(seq.len(), 3);
///
/// let empty: obseq::ObservableSeq<u8> = obseq![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! obseq {
    () => {
        $crate::ObservableSeq::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::ObservableSeq::from(vec![$($value),+])
    };
}
