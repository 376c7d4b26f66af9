//! Field definitions, types, and the [`FieldSet`] bitset.

use crate::id::FieldId;

/// Where a field's values live and how many are stored per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// One value per cell, located at the cell centre.
    Scalar,
    /// One value per face.
    ///
    /// Slot `i * dims + d` is the face shared by cell `i` and its lower
    /// neighbour along axis `d`. On non-periodic grids the upper boundary
    /// faces follow, so the buffer is longer than `cell_count * dims`; the
    /// grid's face layout fixes the exact count.
    Face {
        /// Number of axes (2 or 3 for the supported lattices).
        dims: u32,
    },
}

/// How a field may change across steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMutability {
    /// Initialised once at world creation and never written by a
    /// propagator (grid metrics).
    Static,
    /// May be rewritten every step.
    PerStep,
}

/// Definition of a field registered in a simulation world.
///
/// Fields are registered at world creation; `FieldId` is the index into
/// the field list.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    /// Human-readable name for debugging and logging.
    pub name: String,
    /// Location and dimensionality.
    pub field_type: FieldType,
    /// Whether propagators may write the field.
    pub mutability: FieldMutability,
    /// Optional unit annotation (e.g., `"kg/m^3"`).
    pub units: Option<String>,
    /// Optional `(min, max)` nominal range, informational only.
    pub bounds: Option<(f64, f64)>,
}

impl FieldDef {
    /// A per-step scalar field with no units or bounds.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Scalar,
            mutability: FieldMutability::PerStep,
            units: None,
            bounds: None,
        }
    }

    /// A per-step face field on a `dims`-axis grid.
    pub fn face(name: impl Into<String>, dims: u32) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Face { dims },
            mutability: FieldMutability::PerStep,
            units: None,
            bounds: None,
        }
    }

    /// Mark the field as [`FieldMutability::Static`].
    pub fn into_static(mut self) -> Self {
        self.mutability = FieldMutability::Static;
        self
    }

    /// Attach a unit annotation.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Attach a nominal `(min, max)` range.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Number of f64 slots the field occupies on a grid with `cell_count`
    /// cells and `face_count` faces.
    pub fn len_for(&self, cell_count: usize, face_count: usize) -> usize {
        match self.field_type {
            FieldType::Scalar => cell_count,
            FieldType::Face { .. } => face_count,
        }
    }

    /// Check structural invariants.
    ///
    /// Rejects empty names, zero-dimensional face fields, and bounds that
    /// are non-finite or inverted.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("field name must not be empty".to_string());
        }
        if let FieldType::Face { dims: 0 } = self.field_type {
            return Err(format!("face field '{}' has zero dims", self.name));
        }
        if let Some((lo, hi)) = self.bounds {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(format!(
                    "field '{}' bounds must be finite, got ({lo}, {hi})",
                    self.name
                ));
            }
            if lo > hi {
                return Err(format!(
                    "field '{}' bounds inverted: min {lo} > max {hi}",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// A set of field IDs stored as a growable bitset.
///
/// Propagators declare their reads and writes as `FieldSet`s so the
/// pipeline can check them against the world's field table once, at
/// construction.
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    words: Vec<u64>,
}

impl FieldSet {
    const WORD_BITS: usize = 64;

    /// Create an empty field set.
    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    fn locate(field: FieldId) -> (usize, u64) {
        let i = field.0 as usize;
        (i / Self::WORD_BITS, 1u64 << (i % Self::WORD_BITS))
    }

    /// Insert a field ID into the set.
    pub fn insert(&mut self, field: FieldId) {
        let (word, mask) = Self::locate(field);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= mask;
    }

    /// Check whether the set contains a field ID.
    pub fn contains(&self, field: FieldId) -> bool {
        let (word, mask) = Self::locate(field);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        let len = self.words.len().max(other.words.len());
        let words = (0..len)
            .map(|i| self.word(i) | other.word(i))
            .collect();
        Self { words }
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        let len = self.words.len().min(other.words.len());
        let words = (0..len).map(|i| self.words[i] & other.words[i]).collect();
        Self { words }
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        let words = (0..self.words.len())
            .map(|i| self.word(i) & !other.word(i))
            .collect();
        Self { words }
    }

    /// Returns `true` if the set contains no fields.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the number of fields in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the field IDs in the set, in ascending order.
    pub fn iter(&self) -> FieldSetIter<'_> {
        FieldSetIter {
            words: &self.words,
            next_bit: 0,
        }
    }

    fn word(&self, i: usize) -> u64 {
        self.words.get(i).copied().unwrap_or(0)
    }
}

impl PartialEq for FieldSet {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| self.word(i) == other.word(i))
    }
}

impl Eq for FieldSet {}

impl FromIterator<FieldId> for FieldSet {
    fn from_iter<I: IntoIterator<Item = FieldId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = FieldId;
    type IntoIter = FieldSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over field IDs in a [`FieldSet`], yielding IDs in ascending order.
pub struct FieldSetIter<'a> {
    words: &'a [u64],
    next_bit: usize,
}

impl Iterator for FieldSetIter<'_> {
    type Item = FieldId;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.words.len() * FieldSet::WORD_BITS;
        while self.next_bit < total {
            let bit = self.next_bit;
            self.next_bit += 1;
            if self.words[bit / FieldSet::WORD_BITS] & (1u64 << (bit % FieldSet::WORD_BITS)) != 0 {
                return Some(FieldId(bit as u32));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_field_set() -> impl Strategy<Value = FieldSet> {
        prop::collection::vec(0u32..160, 0..24)
            .prop_map(|ids| ids.into_iter().map(FieldId).collect::<FieldSet>())
    }

    #[test]
    fn len_for_follows_location() {
        assert_eq!(FieldDef::scalar("rho").len_for(10, 27), 10);
        assert_eq!(FieldDef::face("mu", 2).len_for(10, 27), 27);
    }

    #[test]
    fn validate_rejects_bad_defs() {
        assert!(FieldDef::scalar("").validate().is_err());
        assert!(FieldDef::face("alpha", 0).validate().is_err());
        assert!(FieldDef::scalar("f1")
            .with_bounds(1.0, 0.0)
            .validate()
            .is_err());
        assert!(FieldDef::scalar("f1")
            .with_bounds(0.0, f64::INFINITY)
            .validate()
            .is_err());
        assert!(FieldDef::scalar("f1").with_bounds(0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn into_static_sets_mutability() {
        let def = FieldDef::scalar("cm").into_static();
        assert_eq!(def.mutability, FieldMutability::Static);
    }

    #[test]
    fn iter_is_ascending_across_words() {
        let set: FieldSet = [FieldId(130), FieldId(2), FieldId(64)].into_iter().collect();
        let ids: Vec<FieldId> = set.iter().collect();
        assert_eq!(ids, vec![FieldId(2), FieldId(64), FieldId(130)]);
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_field_set(), b in arb_field_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn union_contains_both(a in arb_field_set(), b in arb_field_set()) {
            let u = a.union(&b);
            prop_assert!(a.difference(&u).is_empty());
            prop_assert!(b.difference(&u).is_empty());
        }

        #[test]
        fn difference_removes_common(a in arb_field_set(), b in arb_field_set()) {
            let diff = a.difference(&b);
            for field in diff.iter() {
                prop_assert!(a.contains(field), "diff element {field:?} not in a");
                prop_assert!(!b.contains(field), "diff element {field:?} in b");
            }
        }

        #[test]
        fn intersection_within_both(a in arb_field_set(), b in arb_field_set()) {
            let i = a.intersection(&b);
            prop_assert!(i.difference(&a).is_empty());
            prop_assert!(i.difference(&b).is_empty());
        }

        #[test]
        fn len_matches_iter_count(a in arb_field_set()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }
    }
}
