//! A1-style cell, range and sheet-qualified range addressing
//!
//! Table-change notifications carry addresses such as `C2`, `A1:C1`, `D:D`
//! or `'Product Sheet'!A1:C1`. These types parse them so an edit can be
//! tested against a table's header row.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use tracked_tables_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// assert!(addr.row_absolute && addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row = parse_row_number(row_str)
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("invalid column letter '{}'", c)));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col - 1, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();

        if self.col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));

        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&(self.row + 1).to_string());

        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a 1-based row number into a 0-based index
fn parse_row_number(s: &str) -> Result<u32> {
    let row: u32 = s
        .parse()
        .map_err(|_| Error::InvalidAddress(format!("invalid row number '{}'", s)))?;

    if row == 0 {
        return Err(Error::InvalidAddress(format!("row number must be >= 1 in '{}'", s)));
    }
    if row > MAX_ROWS {
        return Err(Error::RowOutOfBounds(row - 1, MAX_ROWS - 1));
    }

    Ok(row - 1)
}

/// A rectangular range of cells (e.g., "A1:C1", "D:D", "3:3")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so `start` is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress {
                row: start.row.min(end.row),
                col: start.col.min(end.col),
                ..start
            },
            end: CellAddress {
                row: start.row.max(end.row),
                col: start.col.max(end.col),
                ..end
            },
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from `A1:B10`, `A1`, `C:E` or `3:5` notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let Some((left, right)) = s.split_once(':') else {
            return Ok(Self::single(CellAddress::parse(s)?));
        };

        let (l, r) = (left.trim().replace('$', ""), right.trim().replace('$', ""));

        if is_all(&l, |b| b.is_ascii_alphabetic()) && is_all(&r, |b| b.is_ascii_alphabetic()) {
            let start_col = CellAddress::letters_to_column(&l)?;
            let end_col = CellAddress::letters_to_column(&r)?;
            return Ok(Self::from_indices(0, start_col, MAX_ROWS - 1, end_col));
        }

        if is_all(&l, |b| b.is_ascii_digit()) && is_all(&r, |b| b.is_ascii_digit()) {
            let start_row = parse_row_number(&l)?;
            let end_row = parse_row_number(&r)?;
            return Ok(Self::from_indices(start_row, 0, end_row, MAX_COLS - 1));
        }

        let start = CellAddress::parse(left)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
        let end = CellAddress::parse(right)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
        Ok(Self::new(start, end))
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Check if this range overlaps with another
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

fn is_all(s: &str, pred: impl Fn(u8) -> bool) -> bool {
    !s.is_empty() && s.bytes().all(pred)
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A range optionally qualified with a worksheet name (`'My Sheet'!A1:C1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRange {
    /// Worksheet name, unquoted
    pub sheet: Option<String>,
    /// The cell range on that sheet
    pub range: CellRange,
}

impl SheetRange {
    /// Parse a possibly sheet-qualified range
    ///
    /// ```
    /// use tracked_tables_core::SheetRange;
    ///
    /// let r = SheetRange::parse("'Bob''s Data'!B2:D2").unwrap();
    /// assert_eq!(r.sheet.as_deref(), Some("Bob's Data"));
    /// assert_eq!(r.range.to_a1_string(), "B2:D2");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rfind('!') {
            Some(pos) => Ok(Self {
                sheet: Some(unquote_sheet(&s[..pos])?),
                range: CellRange::parse(&s[pos + 1..])?,
            }),
            None => Ok(Self {
                sheet: None,
                range: CellRange::parse(s)?,
            }),
        }
    }

    /// Parse `address`, qualifying it with `sheet` when it carries no sheet of its own
    pub fn qualified(sheet: &str, address: &str) -> Result<Self> {
        let mut parsed = Self::parse(address)?;
        if parsed.sheet.is_none() {
            parsed.sheet = Some(sheet.to_string());
        }
        Ok(parsed)
    }

    /// Whether two ranges share at least one cell.
    ///
    /// Sheet names are compared case-insensitively and only when both sides have one.
    pub fn intersects(&self, other: &SheetRange) -> bool {
        if let (Some(a), Some(b)) = (&self.sheet, &other.sheet) {
            if !a.eq_ignore_ascii_case(b) {
                return false;
            }
        }
        self.range.overlaps(&other.range)
    }
}

fn unquote_sheet(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let name = if let Some(inner) = raw.strip_prefix('\'') {
        inner
            .strip_suffix('\'')
            .ok_or_else(|| Error::InvalidRange(format!("unterminated sheet quote in '{}'", raw)))?
            .replace("''", "'")
    } else {
        raw.to_string()
    };

    if name.is_empty() {
        return Err(Error::InvalidRange("empty sheet name".into()));
    }
    Ok(name)
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                write!(f, "{}!{}", sheet, self.range)
            }
            Some(sheet) => write!(f, "'{}'!{}", sheet.replace('\'', "''"), self.range),
            None => write!(f, "{}", self.range),
        }
    }
}

impl FromStr for SheetRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
