//! `CREATE TABLE` generation

use crate::error::{FunctionError, FunctionResult};

/// One column of a generated table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    /// Empty means no precision clause
    pub precision: String,
}

impl ColumnDef {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        precision: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            precision: precision.into(),
        }
    }

    /// Build column definitions from parallel worksheet ranges.
    ///
    /// Every name needs a type and a precision cell (the precision cell may
    /// be empty). Extra type or precision cells are ignored.
    pub fn from_ranges<N, T, P>(
        names: &[N],
        types: &[T],
        precisions: &[P],
    ) -> FunctionResult<Vec<Self>>
    where
        N: AsRef<str>,
        T: AsRef<str>,
        P: AsRef<str>,
    {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| -> FunctionResult<Self> {
                let data_type = types.get(index).ok_or(FunctionError::MissingAttribute {
                    index,
                    attribute: "type",
                })?;
                let precision = precisions.get(index).ok_or(FunctionError::MissingAttribute {
                    index,
                    attribute: "precision",
                })?;
                Ok(Self::new(name.as_ref(), data_type.as_ref(), precision.as_ref()))
            })
            .collect()
    }

    fn to_sql(&self) -> String {
        if self.precision.is_empty() {
            format!("\t{} {}", self.name, self.data_type)
        } else {
            format!("\t{} {}({})", self.name, self.data_type, self.precision)
        }
    }
}

/// Generate a `CREATE TABLE` statement, one tab-indented column per line
///
/// ```
/// use tracked_tables_functions::{make_sql, ColumnDef};
///
/// let sql = make_sql("t", &[ColumnDef::new("id", "INT", "")]).unwrap();
/// assert_eq!(sql, "CREATE TABLE t (\n\tid INT\n);");
/// ```
pub fn make_sql(table: &str, columns: &[ColumnDef]) -> FunctionResult<String> {
    if table.trim().is_empty() {
        return Err(FunctionError::EmptyTableName);
    }

    let body: Vec<String> = columns.iter().map(ColumnDef::to_sql).collect();
    Ok(format!("CREATE TABLE {} (\n{}\n);", table, body.join(",\n")))
}
