//! Tracked column type

use serde::{Deserialize, Serialize};

/// One logical column of a tracked table
///
/// A column is either bound to a field of the external data source
/// (`source = Some(..)`) or purely presentational (`source = None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedColumn {
    /// Header label of the column in the table
    pub name: String,
    /// Data source field this column is filled from
    #[serde(default)]
    pub source: Option<String>,
    /// Set once the user has changed a bound column by hand
    #[serde(default)]
    pub is_dirty: bool,
    /// Previous header labels, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_history: Vec<String>,
}

impl TrackedColumn {
    /// Create a column bound to a data source field
    pub fn bound(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            is_dirty: false,
            name_history: Vec::new(),
        }
    }

    /// Create a presentational column with no data source
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            is_dirty: false,
            name_history: Vec::new(),
        }
    }

    /// Check if the column is filled from the data source
    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// Rename the column, remembering the old label
    pub fn rename(&mut self, name: impl Into<String>) {
        let old = std::mem::replace(&mut self.name, name.into());
        self.name_history.push(old);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rename_keeps_history() {
        let mut col = TrackedColumn::bound("Member Caption", "memberCaption");
        col.rename("Caption");
        col.rename("Title");

        assert_eq!(col.name, "Title");
        assert_eq!(col.name_history, vec!["Member Caption", "Caption"]);
        assert_eq!(col.source.as_deref(), Some("memberCaption"));
    }

    #[test]
    fn test_serde_shape() {
        let col = TrackedColumn::unbound("Product");
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Product", "source": null, "isDirty": false})
        );

        let parsed: TrackedColumn =
            serde_json::from_str(r#"{"name":"Code","source":"primarySystemCode"}"#).unwrap();
        assert!(parsed.is_bound());
        assert!(!parsed.is_dirty);
        assert!(parsed.name_history.is_empty());
    }
}
