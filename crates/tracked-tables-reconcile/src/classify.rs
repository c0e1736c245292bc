//! Column change classification
//!
//! Compares the header labels of a table before and after an edit and sorts
//! the difference into renames, reorders, insertions and deletions.
//!
//! Renames are inferred positionally: when exactly as many labels vanished as
//! appeared, the i-th vanished label is paired with the i-th new one. Two
//! simultaneous renames can therefore be paired the wrong way round; nothing
//! here tries to detect that.

use ahash::AHashSet;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A column label that changed from `before` to `after`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Rename {
    pub before: String,
    pub after: String,
}

impl Rename {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Classified difference between two header label sequences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnChanges {
    /// Labels paired as renames, in first-seen order
    pub renamed: Vec<Rename>,
    /// Labels present on both sides but at a different position
    pub reordered: Vec<String>,
    /// Labels only present after the edit
    pub inserted: Vec<String>,
    /// Labels only present before the edit
    pub deleted: Vec<String>,
}

impl ColumnChanges {
    /// Whether the two sequences differ in any classified way
    pub fn has_changes(&self) -> bool {
        !self.renamed.is_empty()
            || !self.reordered.is_empty()
            || !self.inserted.is_empty()
            || !self.deleted.is_empty()
    }
}

impl Serialize for ColumnChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ColumnChanges", 5)?;
        s.serialize_field("renamed", &self.renamed)?;
        s.serialize_field("reordered", &self.reordered)?;
        s.serialize_field("inserted", &self.inserted)?;
        s.serialize_field("deleted", &self.deleted)?;
        s.serialize_field("hasChanges", &self.has_changes())?;
        s.end()
    }
}

/// Classify the change from `before` to `after`.
///
/// ```
/// use tracked_tables_reconcile::{classify, Rename};
///
/// let changes = classify(&["A", "B", "C"], &["A", "X", "C"]);
/// assert_eq!(changes.renamed, vec![Rename::new("B", "X")]);
/// assert!(changes.inserted.is_empty() && changes.deleted.is_empty());
/// ```
pub fn classify<B, A>(before: &[B], after: &[A]) -> ColumnChanges
where
    B: AsRef<str>,
    A: AsRef<str>,
{
    let before_set: AHashSet<&str> = before.iter().map(AsRef::as_ref).collect();
    let after_set: AHashSet<&str> = after.iter().map(AsRef::as_ref).collect();

    let mut inserted: Vec<String> = after
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| !before_set.contains(label))
        .map(str::to_string)
        .collect();
    let mut deleted: Vec<String> = before
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| !after_set.contains(label))
        .map(str::to_string)
        .collect();

    let mut renamed = Vec::new();
    if !deleted.is_empty() && deleted.len() == inserted.len() {
        renamed = deleted
            .drain(..)
            .zip(inserted.drain(..))
            .map(|(before, after)| Rename { before, after })
            .collect();
    }

    let mut reordered = Vec::new();
    if renamed.is_empty() {
        for (i, label) in before.iter().enumerate() {
            let label: &str = label.as_ref();
            let moved = after.get(i).map(|a| a.as_ref()) != Some(label);
            if moved && after_set.contains(label) {
                reordered.push(label.to_string());
            }
        }
    }

    ColumnChanges {
        renamed,
        reordered,
        inserted,
        deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY: [&str; 0] = [];

    #[test]
    fn test_identical_has_no_changes() {
        let changes = classify(&["A", "B", "C"], &["A", "B", "C"]);
        assert_eq!(changes, ColumnChanges::default());
        assert!(!changes.has_changes());

        assert!(!classify(&EMPTY, &EMPTY).has_changes());
    }

    #[test]
    fn test_single_rename() {
        let changes = classify(&["A", "B", "C"], &["A", "X", "C"]);
        assert_eq!(changes.renamed, vec![Rename::new("B", "X")]);
        assert!(changes.reordered.is_empty());
        assert!(changes.has_changes());
    }

    #[test]
    fn test_multiple_renames_pair_in_first_seen_order() {
        let changes = classify(&["A", "B", "C"], &["Y", "B", "X"]);
        assert_eq!(
            changes.renamed,
            vec![Rename::new("A", "Y"), Rename::new("C", "X")]
        );
    }

    #[test]
    fn test_swap_is_reorder() {
        let changes = classify(&["A", "B"], &["B", "A"]);
        assert!(changes.renamed.is_empty());
        assert_eq!(changes.reordered, vec!["A", "B"]);
        assert!(changes.inserted.is_empty());
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_empty_before_inserts_everything() {
        let changes = classify(&EMPTY, &["A", "B"]);
        assert_eq!(changes.inserted, vec!["A", "B"]);
        assert!(changes.renamed.is_empty());
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_empty_after_deletes_everything() {
        let changes = classify(&["A", "B"], &EMPTY);
        assert_eq!(changes.deleted, vec!["A", "B"]);
        assert!(changes.renamed.is_empty());
        assert!(changes.reordered.is_empty());
    }

    #[test]
    fn test_deletion_shifts_following_columns() {
        let changes = classify(&["A", "B", "C"], &["A", "C"]);
        assert_eq!(changes.deleted, vec!["B"]);
        assert_eq!(changes.reordered, vec!["C"]);
    }

    #[test]
    fn test_insert_without_delete() {
        let changes = classify(&["A", "B"], &["A", "New", "B"]);
        assert_eq!(changes.inserted, vec!["New"]);
        assert_eq!(changes.reordered, vec!["B"]);
        assert!(changes.renamed.is_empty());
    }

    #[test]
    fn test_serializes_has_changes() {
        let json = serde_json::to_value(classify(&["A"], &["A", "B"])).unwrap();
        assert_eq!(json["hasChanges"], serde_json::json!(true));
        assert_eq!(json["inserted"], serde_json::json!(["B"]));
    }
}
