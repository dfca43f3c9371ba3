//! Property-based invariant tests for `ObservableSeq`.
//!
//! 1. `set(i, v)` then `get(i)` yields `v`.
//! 2. `push(vs)` grows `len` by `vs.len()` and leaves `vs` as the tail.
//! 3. `pop()` right after `push_one(v)` returns `v` and restores `len`.
//! 4. Every dispatch pair is (specific, change) with one payload.
//! 5. `update_by` that never writes dispatches nothing and changes nothing.
//! 6. `remove_where` partitions: removed ++ kept is a permutation that keeps
//!    relative order on both sides.
//! 7. `splice` payload equals the pre-mutation window, and an insert-only
//!    `splice` still dispatches (with an empty payload).
//! 8. Contents always match a plain `Vec<Option<T>>` model.

use std::cell::RefCell;
use std::rc::Rc;

use obseq::{ChangeEvent, EventKind, ObservableSeq};
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<(EventKind, ChangeEvent<i32>)>>>;

fn record_all(seq: &mut ObservableSeq<i32>) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    for kind in EventKind::ALL {
        let sink = Rc::clone(&log);
        seq.on(kind, move |_, ev| sink.borrow_mut().push((kind, ev.clone())));
    }
    log
}

// ── Strategies ────────────────────────────────────────────────────────────

fn values_strategy(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-1000i32..=1000, 0..=max_len)
}

fn slots_strategy(max_len: usize) -> impl Strategy<Value = Vec<Option<i32>>> {
    proptest::collection::vec(proptest::option::of(-1000i32..=1000), 0..=max_len)
}

#[derive(Debug, Clone)]
enum Op {
    Push(Vec<i32>),
    Pop,
    Shift,
    Unshift(Vec<i32>),
    Reverse,
    Sort,
    Splice(usize, usize, Vec<i32>),
    Set(usize, i32),
    InsertAll(Vec<Option<i32>>),
    UpdateEven,
    RemoveNegative,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        values_strategy(4).prop_map(Op::Push),
        Just(Op::Pop),
        Just(Op::Shift),
        values_strategy(4).prop_map(Op::Unshift),
        Just(Op::Reverse),
        Just(Op::Sort),
        (0usize..12, 0usize..6, values_strategy(3)).prop_map(|(s, d, v)| Op::Splice(s, d, v)),
        (0usize..12, -1000i32..=1000).prop_map(|(i, v)| Op::Set(i, v)),
        slots_strategy(3).prop_map(Op::InsertAll),
        Just(Op::UpdateEven),
        Just(Op::RemoveNegative),
    ]
}

fn sort_model(model: &mut [Option<i32>]) {
    model.sort_by(|a, b| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Apply `op` to both the sequence and the model. Returns `None` when the
/// mutation should stay silent, otherwise the number of items it reports.
fn apply(seq: &mut ObservableSeq<i32>, model: &mut Vec<Option<i32>>, op: &Op) -> Option<usize> {
    let reported = match op {
        Op::Push(vs) => {
            let len = seq.push(vs.clone()).unwrap();
            model.extend(vs.iter().copied().map(Some));
            assert_eq!(len, model.len());
            vs.len()
        }
        Op::Pop => {
            let got = seq.pop().unwrap();
            let expected = model.pop();
            assert_eq!(got, expected.flatten());
            usize::from(expected.is_some())
        }
        Op::Shift => {
            let got = seq.shift().unwrap();
            if model.is_empty() {
                assert_eq!(got, None);
                0
            } else {
                assert_eq!(got, model.remove(0));
                1
            }
        }
        Op::Unshift(vs) => {
            seq.unshift(vs.clone()).unwrap();
            model.splice(0..0, vs.iter().copied().map(Some));
            vs.len()
        }
        Op::Reverse => {
            seq.reverse().unwrap();
            model.reverse();
            model.len()
        }
        Op::Sort => {
            seq.sort().unwrap();
            sort_model(model);
            model.len()
        }
        Op::Splice(start, delete, vs) => {
            let removed = seq.splice(*start, *delete, vs.clone()).unwrap();
            let s = (*start).min(model.len());
            let e = s + (*delete).min(model.len() - s);
            let expected: Vec<_> = model.splice(s..e, vs.iter().copied().map(Some)).collect();
            assert_eq!(removed, expected);
            if expected.is_empty() && !vs.is_empty() {
                return Some(0);
            }
            expected.len()
        }
        Op::Set(i, v) => {
            seq.set(*i, *v).unwrap();
            if *i >= model.len() {
                model.resize(*i + 1, None);
            }
            model[*i] = Some(*v);
            1
        }
        Op::InsertAll(slots) => {
            seq.insert_all(slots.clone()).unwrap();
            model.extend(slots.iter().copied());
            slots.len()
        }
        Op::UpdateEven => {
            seq.update_by(|v, _| v.filter(|v| *v % 2 == 0).map(|v| v / 2))
                .unwrap();
            let mut written = 0;
            for slot in model.iter_mut() {
                if let Some(v) = slot.filter(|v| v % 2 == 0) {
                    *slot = Some(v / 2);
                    written += 1;
                }
            }
            written
        }
        Op::RemoveNegative => {
            seq.remove_where(|v, _| v.is_some_and(|v| *v < 0)).unwrap();
            let before = model.len();
            model.retain(|slot| !slot.is_some_and(|v| v < 0));
            before - model.len()
        }
    };
    (reported > 0).then_some(reported)
}

proptest! {
    #[test]
    fn set_then_get(values in values_strategy(16), index in 0usize..32, value in any::<i32>()) {
        let mut seq = ObservableSeq::from(values);
        seq.set(index, value).unwrap();
        prop_assert_eq!(seq.get(index), Some(&value));
        prop_assert!(seq.len() > index);
    }

    #[test]
    fn push_grows_by_count(initial in values_strategy(16), pushed in values_strategy(8)) {
        let mut seq = ObservableSeq::from(initial.clone());
        let new_len = seq.push(pushed.clone()).unwrap();

        prop_assert_eq!(new_len, initial.len() + pushed.len());
        prop_assert_eq!(seq.len(), new_len);
        let tail: Vec<i32> = seq.values().skip(initial.len()).copied().collect();
        prop_assert_eq!(tail, pushed);
    }

    #[test]
    fn pop_undoes_push_one(initial in values_strategy(16), value in any::<i32>()) {
        let mut seq = ObservableSeq::from(initial.clone());
        seq.push_one(value).unwrap();
        prop_assert_eq!(seq.pop().unwrap(), Some(value));
        prop_assert_eq!(seq.len(), initial.len());
    }

    #[test]
    fn update_by_none_is_silent(slots in slots_strategy(16)) {
        let mut seq = ObservableSeq::from_slots(slots.clone());
        let log = record_all(&mut seq);
        seq.update_by(|_, _| None).unwrap();
        prop_assert_eq!(seq.as_slice(), slots.as_slice());
        prop_assert!(log.borrow().is_empty());
    }

    #[test]
    fn remove_where_partitions_in_order(values in values_strategy(24), modulus in 1i32..5) {
        let mut seq = ObservableSeq::from(values.clone());
        let log = record_all(&mut seq);
        seq.remove_where(|v, _| v.is_some_and(|v| v.rem_euclid(modulus) == 0)).unwrap();

        let (removed, kept): (Vec<i32>, Vec<i32>) =
            values.iter().partition(|v| v.rem_euclid(modulus) == 0);
        prop_assert_eq!(seq.values().copied().collect::<Vec<_>>(), kept);
        let log = log.borrow();
        if removed.is_empty() {
            prop_assert!(log.is_empty());
        } else {
            prop_assert_eq!(log.len(), 2);
            prop_assert_eq!(log[0].1.values().copied().collect::<Vec<_>>(), removed);
        }
    }

    #[test]
    fn splice_reports_window(values in values_strategy(16), start in 0usize..20, delete in 0usize..20) {
        let mut seq = ObservableSeq::from(values.clone());
        let log = record_all(&mut seq);
        let removed = seq.splice(start, delete, []).unwrap();

        let s = start.min(values.len());
        let e = s + delete.min(values.len() - s);
        let window: Vec<Option<i32>> = values[s..e].iter().copied().map(Some).collect();
        prop_assert_eq!(&removed, &window);
        if !window.is_empty() {
            prop_assert_eq!(&log.borrow()[0].1.items, &window);
        }
    }

    #[test]
    fn random_ops_match_model_and_pair_events(
        initial in slots_strategy(8),
        ops in proptest::collection::vec(op_strategy(), 1..24),
    ) {
        let mut seq = ObservableSeq::from_slots(initial.clone());
        let mut model = initial;
        let log = record_all(&mut seq);

        for op in &ops {
            let before = log.borrow().len();
            let affected = apply(&mut seq, &mut model, op);
            let after = log.borrow().len();

            prop_assert_eq!(seq.as_slice(), model.as_slice());
            prop_assert_eq!(seq.len(), model.len());
            if let Some(affected) = affected {
                prop_assert_eq!(after, before + 2, "op {:?} should dispatch twice", op);
                let log = log.borrow();
                let (specific, change) = (&log[before], &log[before + 1]);
                prop_assert_eq!(specific.0, specific.1.kind);
                prop_assert_eq!(change.0, EventKind::Change);
                prop_assert_eq!(&specific.1, &change.1);
                prop_assert_eq!(specific.1.len(), affected);
            } else {
                prop_assert_eq!(after, before, "op {:?} should be silent", op);
            }
        }
    }
}
