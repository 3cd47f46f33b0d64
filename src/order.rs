//! Deterministic ordering substrate.
//!
//! Entity collections in a BOM carry no semantic order, but serialization must
//! be reproducible: repeated runs over an unchanged graph must be
//! byte-identical. Every entity therefore exposes a comparison key built from
//! its identity-ish fields. Optional fields are wrapped in [`PresentFirst`] so
//! that a present value sorts before an absent one at the first differing
//! position, in both directions, giving a strict weak order any sort can use.

use std::cmp::Ordering;

/// Wrapper over `Option` whose ordering puts `Some` before `None`.
///
/// The derived `Ord` for `Option` sorts `None` first; comparison keys want the
/// opposite so that fully-populated entities lead the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentFirst<T>(pub Option<T>);

impl<T: Ord> Ord for PresentFirst<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl<T: Ord> PartialOrd for PresentFirst<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Borrowing helper: wrap an optional string field for key building.
#[must_use]
pub fn opt_str(value: &Option<String>) -> PresentFirst<&str> {
    PresentFirst(value.as_deref())
}

/// Total order over entities of one kind, decoupled from `Eq`.
///
/// Keys are built from identity-ish fields only, so two distinct entities may
/// compare `Equal`; ties are left to the host sort's stability contract.
pub trait CanonicalOrder {
    fn canonical_cmp(&self, other: &Self) -> Ordering;
}

/// Sort a slice by its canonical comparison keys.
pub fn sort_canonical<T: CanonicalOrder>(items: &mut [T]) {
    items.sort_by(|a, b| a.canonical_cmp(b));
}

/// Return a sorted clone of a slice, leaving the original untouched.
#[must_use]
pub fn sorted_clone<T: CanonicalOrder + Clone>(items: &[T]) -> Vec<T> {
    let mut out = items.to_vec();
    sort_canonical(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_sorts_before_absent() {
        let present = PresentFirst(Some("a"));
        let absent: PresentFirst<&str> = PresentFirst(None);
        assert!(present < absent);
        assert!(absent > present);
    }

    #[test]
    fn both_absent_compare_equal() {
        let a: PresentFirst<&str> = PresentFirst(None);
        let b: PresentFirst<&str> = PresentFirst(None);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn present_values_compare_by_content() {
        assert!(PresentFirst(Some("a")) < PresentFirst(Some("b")));
        assert_eq!(
            PresentFirst(Some("x")).cmp(&PresentFirst(Some("x"))),
            Ordering::Equal
        );
    }

    #[test]
    fn sorting_is_stable_across_runs() {
        struct Named(Option<String>);
        impl CanonicalOrder for Named {
            fn canonical_cmp(&self, other: &Self) -> Ordering {
                opt_str(&self.0).cmp(&opt_str(&other.0))
            }
        }

        let mut first = vec![
            Named(None),
            Named(Some("b".into())),
            Named(Some("a".into())),
        ];
        let mut second = vec![
            Named(Some("a".into())),
            Named(None),
            Named(Some("b".into())),
        ];
        sort_canonical(&mut first);
        sort_canonical(&mut second);
        let names = |v: &[Named]| v.iter().map(|n| n.0.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            names(&first),
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
    }
}
