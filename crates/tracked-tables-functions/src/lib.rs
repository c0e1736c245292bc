//! # tracked-tables-functions
//!
//! Helper functions exposed to worksheets alongside tracked tables:
//! `CREATE TABLE` generation, JSON column maps, key/value storage and
//! a trivial `add`.

pub mod error;
pub mod mapping;
pub mod sql;
pub mod storage;

pub use error::{FunctionError, FunctionResult};
pub use mapping::generate_json_map;
pub use sql::{make_sql, ColumnDef};
pub use storage::{get_value, store_value};

/// Add two numbers
pub fn add(first: f64, second: f64) -> f64 {
    first + second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(add(1.0, 2.0), 3.0);
        assert_eq!(add(-1.5, 0.5), -1.0);
    }
}
