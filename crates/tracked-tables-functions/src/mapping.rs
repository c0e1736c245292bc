//! JSON column maps describing how document paths land in SQL columns

use serde::Serialize;

use crate::error::FunctionResult;

#[derive(Debug, Serialize)]
struct Mappings<'a> {
    #[serde(rename = "SQLMappings")]
    sql_mappings: [TableMapping<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TableMapping<'a> {
    table: &'a str,
    columns_map: Vec<ColumnMapping<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnMapping<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sql_column: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    data_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    precision: Option<&'a str>,
    nullable: bool,
}

/// Cell `i` of a range, treating missing and empty cells alike
fn cell<S: AsRef<str>>(range: &[S], i: usize) -> Option<&str> {
    range.get(i).map(|s| s.as_ref()).filter(|s| !s.is_empty())
}

/// Generate a pretty-printed JSON column map for `table`.
///
/// One entry is produced per row of the longest input range. Attributes
/// whose cell is missing or empty are left out of that entry; `nullable`
/// is always `false`.
pub fn generate_json_map<N, P, T, R>(
    table: &str,
    names: &[N],
    paths: &[P],
    types: &[T],
    precisions: &[R],
) -> FunctionResult<String>
where
    N: AsRef<str>,
    P: AsRef<str>,
    T: AsRef<str>,
    R: AsRef<str>,
{
    let rows = names
        .len()
        .max(paths.len())
        .max(types.len())
        .max(precisions.len());

    let columns_map = (0..rows)
        .map(|i| ColumnMapping {
            sql_column: cell(names, i),
            path: cell(paths, i),
            data_type: cell(types, i),
            precision: cell(precisions, i),
            nullable: false,
        })
        .collect();

    let mappings = Mappings {
        sql_mappings: [TableMapping { table, columns_map }],
    };

    Ok(serde_json::to_string_pretty(&mappings)?)
}
