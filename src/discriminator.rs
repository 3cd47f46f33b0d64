//! Scoped disambiguation of colliding bom-refs.
//!
//! Target schemas require bom-refs to be unique within a document, but the
//! model does not enforce that at construction time. [`discriminate`] renames
//! every colliding occurrence after the first and hands back a guard that
//! restores the original values when dropped, so the renames exist only for
//! the duration of one serialization.

use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use crate::model::Bom;

/// A document whose bom-refs have been made unique, plus the undo log.
///
/// Dereferences to the underlying [`Bom`]. Dependency edges are not
/// rewritten: an edge naming a collided value keeps naming the surviving
/// first occurrence.
#[derive(Debug)]
pub struct DiscriminatedBom<'a> {
    bom: &'a mut Bom,
    /// (renamed value, original value) pairs, in rename order.
    renames: Vec<(String, String)>,
}

/// Rename colliding bom-refs in place.
///
/// The first occurrence of each value (in entity declaration order) keeps it;
/// later occurrences get `{value}-{n}` with the smallest `n >= 1` that does
/// not collide with any value in the document, renamed values included.
pub fn discriminate(bom: &mut Bom) -> DiscriminatedBom<'_> {
    let mut taken: HashSet<String> = HashSet::new();
    bom.each_bom_ref(&mut |r| {
        taken.insert(r.value().to_string());
    });

    let mut seen: HashSet<String> = HashSet::new();
    let mut renames: Vec<(String, String)> = Vec::new();
    bom.each_bom_ref_mut(&mut |r| {
        let original = r.value().to_string();
        if seen.insert(original.clone()) {
            return;
        }
        let mut n = 1u32;
        let renamed = loop {
            let candidate = format!("{original}-{n}");
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        tracing::debug!(from = %original, to = %renamed, "renamed colliding bom-ref");
        taken.insert(renamed.clone());
        r.set_value(renamed.clone());
        renames.push((renamed, original));
    });

    DiscriminatedBom { bom, renames }
}

impl DiscriminatedBom<'_> {
    /// The applied (renamed, original) pairs.
    #[must_use]
    pub fn renames(&self) -> &[(String, String)] {
        &self.renames
    }

    /// Restore every renamed bom-ref to its original value.
    ///
    /// Also runs on drop; calling it explicitly just makes the scope end
    /// visible.
    pub fn reset(&mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.renames.is_empty() {
            return;
        }
        let undo: HashMap<&str, &str> = self
            .renames
            .iter()
            .map(|(renamed, original)| (renamed.as_str(), original.as_str()))
            .collect();
        self.bom.each_bom_ref_mut(&mut |r| {
            if let Some(original) = undo.get(r.value()) {
                r.set_value((*original).to_string());
            }
        });
        self.renames.clear();
    }
}

impl Deref for DiscriminatedBom<'_> {
    type Target = Bom;

    fn deref(&self) -> &Self::Target {
        self.bom
    }
}

impl Drop for DiscriminatedBom<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}
